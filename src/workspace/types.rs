// Data types for the workspace module

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// One executed operation in the session history.
///
/// Entries are append-only; the core never rewrites or truncates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub at: DateTime<Utc>,
    /// Operation kind, e.g. "run_r_script"
    pub operation: String,
    /// Short outcome summary, e.g. "exit_code=0 duration_ms=412"
    pub outcome: String,
}

impl HistoryEntry {
    pub fn new(operation: impl Into<String>, outcome: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            at: Utc::now(),
            operation: operation.into(),
            outcome: outcome.into(),
        }
    }
}

/// Mutable session fields, persisted as `.rworkd/state.json`.
///
/// Unknown fields in a persisted record are ignored on load so older daemons
/// can read state written by newer ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub root: PathBuf,
    #[serde(default)]
    pub primary_file: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub last_touched_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new(root: PathBuf) -> Self {
        let now = Utc::now();
        Self {
            root,
            primary_file: None,
            history: Vec::new(),
            created_at: now,
            last_touched_at: now,
        }
    }
}
