// Error types for the exports module

use crate::sandbox::SandboxError;
use thiserror::Error;

/// Export inspector errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No such export file: {0}")]
    UnknownFile(String),

    #[error("File too large to read: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },

    #[error("Failed to parse table: {0}")]
    PreviewParse(String),

    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    /// Stable wire identifier for this error
    pub fn kind(&self) -> &'static str {
        match self {
            ExportError::UnknownFile(_) => "unknown_file",
            ExportError::TooLarge { .. } => "too_large",
            ExportError::PreviewParse(_) => "preview_parse",
            ExportError::Sandbox(e) => e.kind(),
            ExportError::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
