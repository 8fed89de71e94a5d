// Workspace configuration tools: set_workdir, get_state, which_interpreter

use super::ServiceContext;
use super::handler::{ToolHandler, parse_input};
use super::types::{ErrorBody, ToolDefinition, ToolOutput};
use crate::engine::interpreter;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

/// Number of trailing history entries included in get_state; the full log
/// stays on disk untruncated.
const HISTORY_TAIL: usize = 20;

pub(crate) fn handlers(ctx: Arc<ServiceContext>) -> Vec<Arc<dyn ToolHandler>> {
    vec![
        Arc::new(SetWorkdir { ctx: ctx.clone() }),
        Arc::new(GetState { ctx: ctx.clone() }),
        Arc::new(WhichInterpreter { ctx }),
    ]
}

struct SetWorkdir {
    ctx: Arc<ServiceContext>,
}

#[derive(Debug, Deserialize)]
struct SetWorkdirInput {
    path: String,
}

#[async_trait]
impl ToolHandler for SetWorkdir {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "set_workdir".to_string(),
            description: "Set the working directory for all R operations, creating it if needed"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Directory to use as the workspace root" }
                },
                "required": ["path"]
            }),
        }
    }

    async fn run(&self, input: serde_json::Value) -> Result<ToolOutput, ErrorBody> {
        let SetWorkdirInput { path } = parse_input("set_workdir", input)?;
        let ws = self.ctx.store.open(Path::new(&path))?;
        let warning = ws
            .append_history("set_workdir", format!("root={}", ws.root().display()))
            .await;
        let state = ws.snapshot().await;
        Ok(ToolOutput::new(json!({
            "root": ws.root(),
            "primary_file": state.primary_file,
        }))
        .with_warning(warning))
    }
}

struct GetState {
    ctx: Arc<ServiceContext>,
}

#[async_trait]
impl ToolHandler for GetState {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_state".to_string(),
            description: "Get the current workspace configuration and recent history".to_string(),
            input_schema: json!({ "type": "object", "properties": {} }),
        }
    }

    async fn run(&self, _input: serde_json::Value) -> Result<ToolOutput, ErrorBody> {
        // Asking for state before configuration is a question, not a mistake.
        let Ok(ws) = self.ctx.store.current() else {
            return Ok(ToolOutput::new(json!({ "configured": false })));
        };
        let state = ws.snapshot().await;
        let tail_start = state.history.len().saturating_sub(HISTORY_TAIL);
        Ok(ToolOutput::new(json!({
            "configured": true,
            "root": state.root,
            "primary_file": state.primary_file,
            "created_at": state.created_at,
            "last_touched_at": state.last_touched_at,
            "history_total": state.history.len(),
            "history": state.history[tail_start..].to_vec(),
        })))
    }
}

struct WhichInterpreter {
    ctx: Arc<ServiceContext>,
}

#[async_trait]
impl ToolHandler for WhichInterpreter {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "which_interpreter".to_string(),
            description: "Report the resolved R interpreter binary and any alternatives found"
                .to_string(),
            input_schema: json!({ "type": "object", "properties": {} }),
        }
    }

    async fn run(&self, _input: serde_json::Value) -> Result<ToolOutput, ErrorBody> {
        if let Some(path) = &self.ctx.engine.config().interpreter {
            return Ok(ToolOutput::new(json!({
                "executable": path,
                "alternatives": [path],
                "source": "override",
            })));
        }
        match interpreter::find() {
            Some(found) => Ok(ToolOutput::new(json!({
                "executable": found.path,
                "alternatives": found.alternatives,
                "source": "probe",
            }))),
            None => Err(ErrorBody::new(
                "interpreter_not_found",
                "R not found in PATH",
            )
            .with_details(json!({
                "hints": [
                    "Install R from https://www.r-project.org/",
                    "Add Rscript or R to your system PATH",
                    "Set RWORKD_RSCRIPT to the interpreter binary",
                ]
            }))),
        }
    }
}
