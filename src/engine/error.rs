// Error types for the engine module

use crate::sandbox::SandboxError;
use crate::scripts::ScriptError;
use thiserror::Error;

/// Engine errors: faults of the engine itself, as opposed to a script exiting
/// non-zero, which is a normal completion.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("R interpreter not found; install R or set RWORKD_RSCRIPT")]
    InterpreterNotFound,

    #[error("Another execution is running in this workspace (waited {waited_secs}s)")]
    Busy { waited_secs: u64 },

    #[error("No saved workspace image; run a script with save_image=true first")]
    NoSession,

    #[error("Object probe failed: {0}")]
    Probe(String),

    #[error("Failed to spawn interpreter: {0}")]
    Spawn(String),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Stable wire identifier for this error
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InterpreterNotFound => "interpreter_not_found",
            EngineError::Busy { .. } => "busy",
            EngineError::NoSession => "no_session",
            EngineError::Probe(_) => "probe_failed",
            EngineError::Spawn(_) => "spawn_failed",
            EngineError::Script(e) => e.kind(),
            EngineError::Sandbox(e) => e.kind(),
            EngineError::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
