// Data types for the scripts module

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A managed R source file inside a workspace
#[derive(Debug, Clone, Serialize)]
pub struct ScriptFile {
    pub relative_path: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
    pub is_primary: bool,
}

impl ScriptFile {
    pub fn from_metadata(
        relative_path: String,
        metadata: &std::fs::Metadata,
        is_primary: bool,
    ) -> Self {
        let modified_at = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        Self {
            relative_path,
            size_bytes: metadata.len(),
            modified_at,
            is_primary,
        }
    }
}
