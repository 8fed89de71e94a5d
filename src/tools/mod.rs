// Tools module - named operations over the workspace components
//
// The façade: each tool validates its arguments, resolves paths through the
// sandbox via the component it drives, and maps component errors to stable
// wire kinds. The external dispatch layer never sees a raw error type.

pub mod artifacts;
pub mod error;
pub mod files;
pub mod handler;
pub mod run;
pub mod types;
pub mod workdir;

pub use error::{Result, ToolError};
pub use handler::{ToolHandler, load_tool_descriptions};
pub use types::{ErrorBody, ToolDefinition, ToolOutput};

use crate::engine::Engine;
use crate::exports::ExportInspector;
use crate::workspace::{SessionStore, Workspace};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared component wiring handed to every tool handler
pub struct ServiceContext {
    pub store: SessionStore,
    pub engine: Engine,
    pub exports: ExportInspector,
}

impl ServiceContext {
    /// The currently selected workspace, as a wire error when none is set.
    pub(crate) fn current(&self) -> std::result::Result<Arc<Workspace>, ErrorBody> {
        self.store.current().map_err(ErrorBody::from)
    }
}

/// Tool registry and dispatcher
pub struct Tools {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
    overrides: HashMap<String, String>,
}

impl Tools {
    /// Register every tool, applying description overrides from `tools.toml`
    /// when the file exists.
    pub fn init(ctx: Arc<ServiceContext>, tools_toml: &Path) -> Self {
        let overrides = load_tool_descriptions(tools_toml).unwrap_or_default();
        if !overrides.is_empty() {
            debug!(count = overrides.len(), "applying tool description overrides");
        }

        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        for handler in workdir::handlers(ctx.clone())
            .into_iter()
            .chain(files::handlers(ctx.clone()))
            .chain(run::handlers(ctx.clone()))
            .chain(artifacts::handlers(ctx))
        {
            handlers.insert(handler.name(), handler);
        }

        info!(tool_count = handlers.len(), "tool registry initialized");
        Self {
            handlers,
            overrides,
        }
    }

    /// All tool definitions, for the dispatch layer's tool listing
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .handlers
            .values()
            .map(|h| {
                let mut definition = h.definition();
                if let Some(desc) = self.overrides.get(&definition.name) {
                    definition.description = desc.clone();
                }
                definition
            })
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Execute a tool by name with JSON input
    pub async fn dispatch(
        &self,
        name: &str,
        input: serde_json::Value,
    ) -> std::result::Result<ToolOutput, ErrorBody> {
        let Some(handler) = self.handlers.get(name).cloned() else {
            return Err(ErrorBody::new(
                "unknown_tool",
                format!("Unknown tool: {}", name),
            ));
        };

        // A missing args object means "no arguments".
        let input = if input.is_null() {
            serde_json::json!({})
        } else {
            input
        };

        debug!(tool = %name, "dispatching tool call");
        handler.run(input).await
    }
}
