// Script file tools: create, rename, write, append, set primary, list

use super::ServiceContext;
use super::handler::{ToolHandler, parse_input};
use super::types::{ErrorBody, ToolDefinition, ToolOutput};
use crate::scripts::registry;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub(crate) fn handlers(ctx: Arc<ServiceContext>) -> Vec<Arc<dyn ToolHandler>> {
    vec![
        Arc::new(CreateFile { ctx: ctx.clone() }),
        Arc::new(RenameFile { ctx: ctx.clone() }),
        Arc::new(WriteCode { ctx: ctx.clone() }),
        Arc::new(AppendCode { ctx: ctx.clone() }),
        Arc::new(SetPrimary { ctx: ctx.clone() }),
        Arc::new(ListFiles { ctx }),
    ]
}

fn default_template() -> bool {
    true
}

struct CreateFile {
    ctx: Arc<ServiceContext>,
}

#[derive(Debug, Deserialize)]
struct CreateFileInput {
    relative_path: String,
    #[serde(default = "default_template")]
    template: bool,
}

#[async_trait]
impl ToolHandler for CreateFile {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "create_r_file".to_string(),
            description: "Create a new R script file, optionally from the scaffold template"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "relative_path": { "type": "string" },
                    "template": { "type": "boolean", "default": true }
                },
                "required": ["relative_path"]
            }),
        }
    }

    async fn run(&self, input: serde_json::Value) -> Result<ToolOutput, ErrorBody> {
        let CreateFileInput {
            relative_path,
            template,
        } = parse_input("create_r_file", input)?;
        let ws = self.ctx.current()?;
        let script = registry::create(&ws, &relative_path, template).await?;
        let warning = ws
            .append_history("create_r_file", format!("file={}", script.relative_path))
            .await;
        Ok(ToolOutput::new(json!({ "file": script })).with_warning(warning))
    }
}

struct RenameFile {
    ctx: Arc<ServiceContext>,
}

#[derive(Debug, Deserialize)]
struct RenameFileInput {
    from: String,
    to: String,
}

#[async_trait]
impl ToolHandler for RenameFile {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "rename_r_file".to_string(),
            description: "Rename an R script file; the primary designation follows it".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "from": { "type": "string" },
                    "to": { "type": "string" }
                },
                "required": ["from", "to"]
            }),
        }
    }

    async fn run(&self, input: serde_json::Value) -> Result<ToolOutput, ErrorBody> {
        let RenameFileInput { from, to } = parse_input("rename_r_file", input)?;
        let ws = self.ctx.current()?;
        let primary_updated = registry::rename(&ws, &from, &to).await?;
        let from_name = registry::normalize_name(&from)?;
        let to_name = registry::normalize_name(&to)?;
        let warning = ws
            .append_history("rename_r_file", format!("{} -> {}", from_name, to_name))
            .await;
        Ok(ToolOutput::new(json!({
            "from": from_name,
            "to": to_name,
            "primary_updated": primary_updated,
        }))
        .with_warning(warning))
    }
}

struct WriteCode {
    ctx: Arc<ServiceContext>,
}

#[derive(Debug, Deserialize)]
struct WriteCodeInput {
    relative_path: String,
    content: String,
    #[serde(default)]
    overwrite: bool,
}

#[async_trait]
impl ToolHandler for WriteCode {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "write_r_code".to_string(),
            description: "Write R code to a script file; overwriting requires overwrite=true"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "relative_path": { "type": "string" },
                    "content": { "type": "string" },
                    "overwrite": { "type": "boolean", "default": false }
                },
                "required": ["relative_path", "content"]
            }),
        }
    }

    async fn run(&self, input: serde_json::Value) -> Result<ToolOutput, ErrorBody> {
        let WriteCodeInput {
            relative_path,
            content,
            overwrite,
        } = parse_input("write_r_code", input)?;
        let ws = self.ctx.current()?;
        let script = registry::write(&ws, &relative_path, &content, overwrite).await?;
        let warning = ws
            .append_history(
                "write_r_code",
                format!("file={} bytes={}", script.relative_path, script.size_bytes),
            )
            .await;
        Ok(ToolOutput::new(json!({ "file": script })).with_warning(warning))
    }
}

struct AppendCode {
    ctx: Arc<ServiceContext>,
}

#[derive(Debug, Deserialize)]
struct AppendCodeInput {
    relative_path: String,
    content: String,
}

#[async_trait]
impl ToolHandler for AppendCode {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "append_r_code".to_string(),
            description: "Append R code to an existing script file".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "relative_path": { "type": "string" },
                    "content": { "type": "string" }
                },
                "required": ["relative_path", "content"]
            }),
        }
    }

    async fn run(&self, input: serde_json::Value) -> Result<ToolOutput, ErrorBody> {
        let AppendCodeInput {
            relative_path,
            content,
        } = parse_input("append_r_code", input)?;
        let ws = self.ctx.current()?;
        let bytes_appended = registry::append(&ws, &relative_path, &content).await?;
        let file = registry::normalize_name(&relative_path)?;
        let warning = ws
            .append_history(
                "append_r_code",
                format!("file={} bytes={}", file, bytes_appended),
            )
            .await;
        Ok(ToolOutput::new(json!({
            "file": file,
            "bytes_appended": bytes_appended,
        }))
        .with_warning(warning))
    }
}

struct SetPrimary {
    ctx: Arc<ServiceContext>,
}

#[derive(Debug, Deserialize)]
struct SetPrimaryInput {
    relative_path: String,
}

#[async_trait]
impl ToolHandler for SetPrimary {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "set_primary_file".to_string(),
            description: "Designate the default script for run_r_script".to_string(),
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
        let SetPrimaryInput { relative_path } = parse_input("set_primary_file", input)?;
        let ws = self.ctx.current()?;
        let primary = registry::set_primary(&ws, &relative_path).await?;
        let warning = ws
            .append_history("set_primary_file", format!("file={}", primary))
            .await;
        Ok(ToolOutput::new(json!({ "primary_file": primary })).with_warning(warning))
    }
}

struct ListFiles {
    ctx: Arc<ServiceContext>,
}

#[async_trait]
impl ToolHandler for ListFiles {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "list_r_files".to_string(),
            description: "List tracked R script files, ordered by path".to_string(),
            input_schema: json!({ "type": "object", "properties": {} }),
        }
    }

    async fn run(&self, _input: serde_json::Value) -> Result<ToolOutput, ErrorBody> {
        let ws = self.ctx.current()?;
        let files = registry::list(&ws).await?;
        let primary = ws.primary_file().await;
        Ok(ToolOutput::new(json!({
            "files": files,
            "primary_file": primary,
        })))
    }
}
