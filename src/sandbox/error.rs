// Sandbox errors

use thiserror::Error;

/// Path resolution errors
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("Absolute paths are not allowed: {0}")]
    Absolute(String),

    #[error("Path escapes the workspace root: {0}")]
    Escape(String),

    #[error("IO error while resolving path: {0}")]
    Io(#[from] std::io::Error),
}

impl SandboxError {
    /// Stable wire identifier for this error
    pub fn kind(&self) -> &'static str {
        match self {
            SandboxError::Absolute(_) | SandboxError::Escape(_) => "path_escape",
            SandboxError::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, SandboxError>;
