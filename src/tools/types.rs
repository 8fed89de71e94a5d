// Data types for the tools module

use crate::engine::EngineError;
use crate::exports::ExportError;
use crate::sandbox::SandboxError;
use crate::scripts::ScriptError;
use crate::workspace::WorkspaceError;
use serde::Serialize;
use serde_json::Value;

/// Tool definition surfaced to the dispatch layer
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Successful tool result: a structured payload plus an optional non-fatal
/// warning (e.g. a failed best-effort history persist).
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub data: Value,
    pub warning: Option<String>,
}

impl ToolOutput {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            warning: None,
        }
    }

    pub fn with_warning(mut self, warning: Option<String>) -> Self {
        self.warning = warning;
        self
    }
}

/// Structured error returned to the dispatch layer
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorBody {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<WorkspaceError> for ErrorBody {
    fn from(e: WorkspaceError) -> Self {
        ErrorBody::new(e.kind(), e.to_string())
    }
}

impl From<ScriptError> for ErrorBody {
    fn from(e: ScriptError) -> Self {
        ErrorBody::new(e.kind(), e.to_string())
    }
}

impl From<SandboxError> for ErrorBody {
    fn from(e: SandboxError) -> Self {
        ErrorBody::new(e.kind(), e.to_string())
    }
}

impl From<ExportError> for ErrorBody {
    fn from(e: ExportError) -> Self {
        ErrorBody::new(e.kind(), e.to_string())
    }
}

impl From<EngineError> for ErrorBody {
    fn from(e: EngineError) -> Self {
        // Probe failures carry the captured stderr so a failing script is
        // diagnosable without a second round trip.
        let body = ErrorBody::new(e.kind(), e.to_string());
        match e {
            EngineError::Probe(stderr) if !stderr.is_empty() => {
                body.with_details(serde_json::json!({ "stderr": stderr }))
            }
            _ => body,
        }
    }
}
