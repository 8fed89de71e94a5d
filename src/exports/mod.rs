// Exports module - inspection of analysis artifacts under the workspace root

pub mod config;
pub mod error;
pub mod inspector;
pub mod types;

pub use config::ExportConfig;
pub use error::{ExportError, Result};
pub use inspector::ExportInspector;
pub use types::{ExportEntry, ExportPayload, FileKind, TablePreview};
