// Error types for the workspace module

use thiserror::Error;

/// Workspace store errors
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("No working directory configured; call set_workdir first")]
    NotConfigured,

    #[error("Failed to create workspace directory: {0}")]
    DirectoryCreate(String),

    #[error("Persisted session state is unreadable: {0}")]
    CorruptState(String),

    #[error("Not a tracked script file: {0}")]
    UnknownFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkspaceError {
    /// Stable wire identifier for this error
    pub fn kind(&self) -> &'static str {
        match self {
            WorkspaceError::NotConfigured => "not_configured",
            WorkspaceError::DirectoryCreate(_) => "directory_create",
            WorkspaceError::CorruptState(_) => "corrupt_state",
            WorkspaceError::UnknownFile(_) => "unknown_file",
            WorkspaceError::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkspaceError>;
