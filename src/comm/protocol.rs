// Wire protocol: one JSON object per line

use super::error::{CommError, Result};
use crate::tools::{ErrorBody, ToolOutput};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Incoming tool-call request
#[derive(Debug, Deserialize)]
pub struct Request {
    /// Caller-chosen correlation id, echoed back verbatim
    #[serde(default)]
    pub id: Value,
    pub tool: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Serialize)]
struct Response<'a> {
    id: &'a Value,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a ErrorBody>,
}

pub fn decode_request(line: &str) -> Result<Request> {
    serde_json::from_str(line).map_err(|e| CommError::Decode(e.to_string()))
}

pub fn encode_success(id: &Value, output: &ToolOutput) -> Result<String> {
    let response = Response {
        id,
        ok: true,
        data: Some(&output.data),
        warning: output.warning.as_deref(),
        error: None,
    };
    serde_json::to_string(&response).map_err(|e| CommError::Encode(e.to_string()))
}

pub fn encode_failure(id: &Value, error: &ErrorBody) -> Result<String> {
    let response = Response {
        id,
        ok: false,
        data: None,
        warning: None,
        error: Some(error),
    };
    serde_json::to_string(&response).map_err(|e| CommError::Encode(e.to_string()))
}
