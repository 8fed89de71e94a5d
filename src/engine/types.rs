// Data types for the engine module

use chrono::{DateTime, Utc};
use serde::Serialize;

/// What to execute: a tracked script or an inline expression.
#[derive(Debug, Clone)]
pub enum ExecTarget {
    /// Relative path of a tracked script
    Script(String),
    /// Inline R expression, passed to the interpreter's `-e` argument
    Expression(String),
}

/// A single execution request
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub target: ExecTarget,
    /// Arguments passed to the interpreter as a discrete argv, never through a shell
    pub args: Vec<String>,
    /// Requested wall-clock timeout; the engine clamps to its configured maximum
    pub timeout_secs: Option<u64>,
    /// Save the interpreter workspace image after a script run so bindings
    /// survive for inspection
    pub save_image: bool,
}

impl ExecutionRequest {
    pub fn script(relative_path: impl Into<String>) -> Self {
        Self {
            target: ExecTarget::Script(relative_path.into()),
            args: Vec::new(),
            timeout_secs: None,
            save_image: true,
        }
    }

    pub fn expression(expr: impl Into<String>) -> Self {
        Self {
            target: ExecTarget::Expression(expr.into()),
            args: Vec::new(),
            timeout_secs: None,
            save_image: false,
        }
    }
}

/// Terminal state of an execution.
///
/// `Pending -> Running -> {Completed, TimedOut}`; spawn failures error out of
/// `Pending` and never produce a result. A non-zero exit code is a `Completed`
/// outcome: a script legitimately raising an error is not an engine fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Completed,
    TimedOut,
}

/// Immutable record of one finished execution
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    /// Absent when the subprocess was killed on timeout
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub stdout_truncated: bool,
    pub stderr_truncated: bool,
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
    pub timed_out: bool,
    /// Files created or modified under the root during the run
    pub changed_files: Vec<String>,
}

impl ExecutionResult {
    /// One-line summary for the session history
    pub fn summary(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit_code={} duration_ms={}", code, self.duration_ms),
            None => format!("timed_out duration_ms={}", self.duration_ms),
        }
    }
}
