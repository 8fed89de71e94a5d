// Artifact tools: list_exports, read_export, preview_table

use super::ServiceContext;
use super::handler::{ToolHandler, parse_input};
use super::types::{ErrorBody, ToolDefinition, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub(crate) fn handlers(ctx: Arc<ServiceContext>) -> Vec<Arc<dyn ToolHandler>> {
    vec![
        Arc::new(ListExports { ctx: ctx.clone() }),
        Arc::new(ReadExport { ctx: ctx.clone() }),
        Arc::new(PreviewTable { ctx }),
    ]
}

struct ListExports {
    ctx: Arc<ServiceContext>,
}

#[derive(Debug, Deserialize)]
struct ListExportsInput {
    subdirectory: Option<String>,
}

#[async_trait]
impl ToolHandler for ListExports {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "list_exports".to_string(),
            description: "List output files in the workspace, most recently modified first"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "subdirectory": { "type": "string" }
                }
            }),
        }
    }

    async fn run(&self, input: serde_json::Value) -> Result<ToolOutput, ErrorBody> {
        let ListExportsInput { subdirectory } = parse_input("list_exports", input)?;
        let ws = self.ctx.current()?;
        let files = self
            .ctx
            .exports
            .list(&ws, subdirectory.as_deref())
            .await?;
        Ok(ToolOutput::new(json!({ "files": files })))
    }
}

struct ReadExport {
    ctx: Arc<ServiceContext>,
}

#[derive(Debug, Deserialize)]
struct ReadExportInput {
    relative_path: String,
}

#[async_trait]
impl ToolHandler for ReadExport {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "read_export".to_string(),
            description: "Read an output file; text comes back decoded, binary as base64"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "relative_path": { "type": "string" }
                },
                "required": ["relative_path"]
            }),
        }
    }

    async fn run(&self, input: serde_json::Value) -> Result<ToolOutput, ErrorBody> {
        let ReadExportInput { relative_path } = parse_input("read_export", input)?;
        let ws = self.ctx.current()?;
        let (entry, payload) = self.ctx.exports.read(&ws, &relative_path).await?;
        Ok(ToolOutput::new(json!({
            "file": entry,
            "content": payload,
        })))
    }
}

struct PreviewTable {
    ctx: Arc<ServiceContext>,
}

#[derive(Debug, Deserialize)]
struct PreviewTableInput {
    relative_path: String,
    max_rows: Option<usize>,
}

#[async_trait]
impl ToolHandler for PreviewTable {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "preview_table".to_string(),
            description: "Preview a CSV/TSV file as a bounded table".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "relative_path": { "type": "string" },
                    "max_rows": { "type": "integer", "default": 20 }
                },
                "required": ["relative_path"]
            }),
        }
    }

    async fn run(&self, input: serde_json::Value) -> Result<ToolOutput, ErrorBody> {
        let PreviewTableInput {
            relative_path,
            max_rows,
        } = parse_input("preview_table", input)?;
        let ws = self.ctx.current()?;
        let max_rows = max_rows.unwrap_or(self.ctx.exports.config().default_preview_rows);
        let preview = self
            .ctx
            .exports
            .preview(&ws, &relative_path, max_rows)
            .await?;
        Ok(ToolOutput::new(json!({ "preview": preview })))
    }
}
