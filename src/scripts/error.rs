// Error types for the scripts module

use crate::sandbox::SandboxError;
use crate::workspace::WorkspaceError;
use thiserror::Error;

/// Script registry errors
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Script already exists: {0}")]
    AlreadyExists(String),

    #[error("Refusing to overwrite existing script without overwrite=true: {0}")]
    OverwriteProtection(String),

    #[error("Not a tracked script file: {0}")]
    UnknownFile(String),

    #[error("Invalid script name: {0}")]
    InvalidName(String),

    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    #[error(transparent)]
    State(#[from] WorkspaceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScriptError {
    /// Stable wire identifier for this error
    pub fn kind(&self) -> &'static str {
        match self {
            ScriptError::AlreadyExists(_) => "already_exists",
            ScriptError::OverwriteProtection(_) => "overwrite_protection",
            ScriptError::UnknownFile(_) => "unknown_file",
            ScriptError::InvalidName(_) => "invalid_input",
            ScriptError::Sandbox(e) => e.kind(),
            ScriptError::State(e) => e.kind(),
            ScriptError::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScriptError>;
