// Session store: one live workspace per canonical root

use super::config::WorkspaceConfig;
use super::error::{Result, WorkspaceError};
use super::types::{HistoryEntry, SessionState};
use crate::scripts::scaffold;
use chrono::Utc;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// A live workspace: the canonical root plus its mutable session state.
///
/// Two independent locks: a lightweight metadata mutex guarding the session
/// fields, and the execution mutex held for the whole lifetime of an
/// interpreter subprocess. Metadata updates never wait on a running execution.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    state_dir: PathBuf,
    state_file: PathBuf,
    state: Mutex<SessionState>,
    exec_lock: Mutex<()>,
}

impl Workspace {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reserved state subdirectory (`<root>/.rworkd`)
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Clone of the current session state, for `get_state` and tests
    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn primary_file(&self) -> Option<String> {
        self.state.lock().await.primary_file.clone()
    }

    /// Re-point the primary designation. Trackedness of `relative_path` is the
    /// script registry's responsibility; this is the raw setter.
    pub async fn set_primary(&self, relative_path: Option<String>) -> Result<()> {
        let mut state = self.state.lock().await;
        state.primary_file = relative_path;
        state.last_touched_at = Utc::now();
        persist(&state, &self.state_file)?;
        Ok(())
    }

    /// Append an operation record to the history.
    ///
    /// Always succeeds in memory. Persistence is best-effort: a failure is
    /// logged and returned as a warning string for the caller to surface, and
    /// never aborts the triggering operation.
    pub async fn append_history(
        &self,
        operation: impl Into<String>,
        outcome: impl Into<String>,
    ) -> Option<String> {
        let entry = HistoryEntry::new(operation, outcome);
        let mut state = self.state.lock().await;
        state.history.push(entry);
        state.last_touched_at = Utc::now();
        match persist(&state, &self.state_file) {
            Ok(()) => None,
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "failed to persist session history");
                Some(format!("session history not persisted: {}", e))
            }
        }
    }

    /// Acquire the execution lock, waiting at most `wait`.
    ///
    /// Returns `None` when the lock is still held after the bounded wait;
    /// callers fail fast with a busy error instead of queuing indefinitely.
    pub async fn lock_for_execution(&self, wait: Duration) -> Option<MutexGuard<'_, ()>> {
        tokio::time::timeout(wait, self.exec_lock.lock()).await.ok()
    }
}

/// Registry of live workspaces keyed by canonical root, plus the currently
/// selected one. Injectable: each store is independent, so tests can run many
/// in one process.
pub struct SessionStore {
    config: WorkspaceConfig,
    sessions: RwLock<HashMap<PathBuf, Arc<Workspace>>>,
    current: RwLock<Option<Arc<Workspace>>>,
}

impl SessionStore {
    pub fn new(config: WorkspaceConfig) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
        }
    }

    /// Open (or re-open) a workspace at `path` and select it as current.
    ///
    /// Creates the directory if absent, loads persisted state from the
    /// reserved subdirectory when present, otherwise initializes a fresh
    /// session and persists it immediately. Idempotent per canonical root:
    /// repeated opens return the same live handle.
    pub fn open(&self, path: &Path) -> Result<Arc<Workspace>> {
        let absolute = std::path::absolute(path)?;
        if !absolute.exists() {
            fs::create_dir_all(&absolute)
                .map_err(|e| WorkspaceError::DirectoryCreate(e.to_string()))?;
            info!(root = %absolute.display(), "created workspace directory");
        }
        if !absolute.is_dir() {
            return Err(WorkspaceError::DirectoryCreate(format!(
                "{} is not a directory",
                absolute.display()
            )));
        }
        let root = absolute.canonicalize()?;

        // Holding the write lock across initialization guarantees exactly one
        // live session per root; all the work below is synchronous.
        let mut sessions = self.sessions.write().unwrap();
        if let Some(existing) = sessions.get(&root) {
            debug!(root = %root.display(), "reusing live workspace session");
            let ws = existing.clone();
            drop(sessions);
            *self.current.write().unwrap() = Some(ws.clone());
            return Ok(ws);
        }

        let state_dir = root.join(&self.config.state_dir_name);
        fs::create_dir_all(&state_dir)
            .map_err(|e| WorkspaceError::DirectoryCreate(e.to_string()))?;
        let state_file = state_dir.join(&self.config.state_file_name);

        let mut state = if state_file.exists() {
            let content = fs::read_to_string(&state_file)
                .map_err(|e| WorkspaceError::CorruptState(e.to_string()))?;
            let loaded: SessionState = serde_json::from_str(&content)
                .map_err(|e| WorkspaceError::CorruptState(e.to_string()))?;
            info!(
                root = %root.display(),
                history_len = loaded.history.len(),
                "loaded persisted session state"
            );
            loaded
        } else {
            SessionState::new(root.clone())
        };
        state.root = root.clone();

        // First open of a fresh directory scaffolds the default primary script
        // so execution has a target before any file was created explicitly.
        let default_script = root.join(&self.config.default_primary);
        if !default_script.exists() && state.primary_file.is_none() {
            fs::write(&default_script, scaffold::SCRIPT_SCAFFOLD)?;
            state.primary_file = Some(self.config.default_primary.clone());
            info!(file = %self.config.default_primary, "scaffolded default primary script");
        }

        persist(&state, &state_file)?;

        let ws = Arc::new(Workspace {
            root: root.clone(),
            state_dir,
            state_file,
            state: Mutex::new(state),
            exec_lock: Mutex::new(()),
        });
        sessions.insert(root.clone(), ws.clone());
        drop(sessions);

        *self.current.write().unwrap() = Some(ws.clone());
        info!(root = %root.display(), "workspace session opened");
        Ok(ws)
    }

    /// The currently selected workspace, set by the last successful `open`.
    pub fn current(&self) -> Result<Arc<Workspace>> {
        self.current
            .read()
            .unwrap()
            .clone()
            .ok_or(WorkspaceError::NotConfigured)
    }

    /// Read-only lookup of a previously opened root.
    pub fn get(&self, root: &Path) -> Result<Arc<Workspace>> {
        let canonical = root.canonicalize().map_err(|_| WorkspaceError::NotConfigured)?;
        self.sessions
            .read()
            .unwrap()
            .get(&canonical)
            .cloned()
            .ok_or(WorkspaceError::NotConfigured)
    }
}

/// Atomic state write: serialize to a sibling tmp file, then rename over the
/// record so a crash mid-write never corrupts it.
fn persist(state: &SessionState, state_file: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(state)
        .map_err(|e| WorkspaceError::Io(std::io::Error::other(e)))?;
    let tmp = state_file.with_extension("json.tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, state_file)?;
    debug!(file = %state_file.display(), history_len = state.history.len(), "persisted session state");
    Ok(())
}
