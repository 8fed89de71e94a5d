// Execution tools: run_r_script, run_r_expression, inspect_r_objects

use super::ServiceContext;
use super::handler::{ToolHandler, parse_input};
use super::types::{ErrorBody, ToolDefinition, ToolOutput};
use crate::engine::{ExecTarget, ExecutionRequest};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub(crate) fn handlers(ctx: Arc<ServiceContext>) -> Vec<Arc<dyn ToolHandler>> {
    vec![
        Arc::new(RunScript { ctx: ctx.clone() }),
        Arc::new(RunExpression { ctx: ctx.clone() }),
        Arc::new(InspectObjects { ctx }),
    ]
}

fn default_save_image() -> bool {
    true
}

struct RunScript {
    ctx: Arc<ServiceContext>,
}

#[derive(Debug, Deserialize)]
struct RunScriptInput {
    relative_path: Option<String>,
    #[serde(default)]
    args: Vec<String>,
    timeout_secs: Option<u64>,
    #[serde(default = "default_save_image")]
    save_image: bool,
}

#[async_trait]
impl ToolHandler for RunScript {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "run_r_script".to_string(),
            description: "Execute an R script (the primary file when none is given)".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "relative_path": { "type": "string" },
                    "args": { "type": "array", "items": { "type": "string" } },
                    "timeout_secs": { "type": "integer" },
                    "save_image": { "type": "boolean", "default": true }
                }
            }),
        }
    }

    async fn run(&self, input: serde_json::Value) -> Result<ToolOutput, ErrorBody> {
        let RunScriptInput {
            relative_path,
            args,
            timeout_secs,
            save_image,
        } = parse_input("run_r_script", input)?;
        let ws = self.ctx.current()?;

        let target = match relative_path {
            Some(path) => path,
            None => ws.primary_file().await.ok_or_else(|| {
                ErrorBody::new(
                    "no_primary_file",
                    "No script given and no primary file set; use set_primary_file first",
                )
            })?,
        };

        let request = ExecutionRequest {
            target: ExecTarget::Script(target),
            args,
            timeout_secs,
            save_image,
        };
        let (result, warning) = self.ctx.engine.execute(&ws, request).await?;
        let data = serde_json::to_value(&result)
            .map_err(|e| ErrorBody::new("io", format!("Failed to encode result: {}", e)))?;
        Ok(ToolOutput::new(data).with_warning(warning))
    }
}

struct RunExpression {
    ctx: Arc<ServiceContext>,
}

#[derive(Debug, Deserialize)]
struct RunExpressionInput {
    expression: String,
    timeout_secs: Option<u64>,
}

#[async_trait]
impl ToolHandler for RunExpression {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "run_r_expression".to_string(),
            description: "Execute a single R expression in the workspace".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "expression": { "type": "string" },
                    "timeout_secs": { "type": "integer" }
                },
                "required": ["expression"]
            }),
        }
    }

    async fn run(&self, input: serde_json::Value) -> Result<ToolOutput, ErrorBody> {
        let RunExpressionInput {
            expression,
            timeout_secs,
        } = parse_input("run_r_expression", input)?;
        let ws = self.ctx.current()?;

        let mut request = ExecutionRequest::expression(expression);
        request.timeout_secs = timeout_secs;
        let (result, warning) = self.ctx.engine.execute(&ws, request).await?;
        let data = serde_json::to_value(&result)
            .map_err(|e| ErrorBody::new("io", format!("Failed to encode result: {}", e)))?;
        Ok(ToolOutput::new(data).with_warning(warning))
    }
}

struct InspectObjects {
    ctx: Arc<ServiceContext>,
}

#[async_trait]
impl ToolHandler for InspectObjects {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "inspect_r_objects".to_string(),
            description: "Enumerate bindings in the saved workspace image with short summaries"
                .to_string(),
            input_schema: json!({ "type": "object", "properties": {} }),
        }
    }

    async fn run(&self, _input: serde_json::Value) -> Result<ToolOutput, ErrorBody> {
        let ws = self.ctx.current()?;
        let (objects, warning) = self.ctx.engine.inspect_objects(&ws).await?;
        Ok(ToolOutput::new(json!({
            "count": objects.len(),
            "objects": objects,
        }))
        .with_warning(warning))
    }
}
