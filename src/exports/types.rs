// Data types for the exports module

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Coarse file classification, derived from extension plus a content sniff
/// for unknown extensions. Never persisted; the filesystem is the source of
/// truth on every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Text,
    Table,
    Binary,
    Unknown,
}

/// Read-only view of a file discovered under the workspace root
#[derive(Debug, Clone, Serialize)]
pub struct ExportEntry {
    pub relative_path: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
    pub kind: FileKind,
}

/// Content of a read export: decoded text for text-like kinds, base64 bytes
/// otherwise.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "encoding", rename_all = "snake_case")]
pub enum ExportPayload {
    Utf8 { text: String },
    Base64 { data: String },
}

/// Bounded, ephemeral table preview
#[derive(Debug, Clone, Serialize)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub truncated: bool,
}
