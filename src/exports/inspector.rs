// Export inspector implementation

use super::config::ExportConfig;
use super::error::{ExportError, Result};
use super::types::{ExportEntry, ExportPayload, FileKind, TablePreview};
use crate::sandbox;
use crate::workspace::Workspace;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Read-only inspector for analysis artifacts
pub struct ExportInspector {
    config: ExportConfig,
}

impl ExportInspector {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// List files under the root (or a contained subdirectory), most recently
    /// modified first. The state directory and other dotfiles are skipped.
    pub async fn list(&self, ws: &Workspace, subdirectory: Option<&str>) -> Result<Vec<ExportEntry>> {
        let (dir, prefix) = match subdirectory {
            Some(sub) => {
                let resolved = sandbox::resolve(ws.root(), sub)?;
                if !fs::try_exists(&resolved).await? {
                    return Err(ExportError::UnknownFile(sub.to_string()));
                }
                (resolved, Some(sub.trim_end_matches('/').to_string()))
            }
            None => (ws.root().to_path_buf(), None),
        };

        let mut entries = Vec::new();
        let mut dir_entries = fs::read_dir(&dir).await?;
        while let Some(entry) = dir_entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with('.') {
                continue;
            }
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let relative_path = match &prefix {
                Some(p) => format!("{}/{}", p, name),
                None => name.to_string(),
            };
            let kind = classify(&entry.path()).await;
            entries.push(ExportEntry {
                relative_path,
                size_bytes: metadata.len(),
                modified_at: modified_at(&metadata),
                kind,
            });
        }

        // Most recent first
        entries.sort_by(|a, b| {
            b.modified_at
                .cmp(&a.modified_at)
                .then_with(|| a.relative_path.cmp(&b.relative_path))
        });
        debug!(count = entries.len(), subdirectory = ?subdirectory, "listed exports");
        Ok(entries)
    }

    /// Read a single export. Text-like kinds come back decoded as UTF-8,
    /// everything else as base64 bytes. A size ceiling applies.
    pub async fn read(&self, ws: &Workspace, relative_path: &str) -> Result<(ExportEntry, ExportPayload)> {
        let absolute = self.resolve_file(ws, relative_path).await?;
        let metadata = fs::metadata(&absolute).await?;
        if metadata.len() > self.config.max_read_bytes {
            return Err(ExportError::TooLarge {
                size: metadata.len(),
                limit: self.config.max_read_bytes,
            });
        }

        let bytes = fs::read(&absolute).await?;
        let kind = classify(&absolute).await;
        let payload = match kind {
            FileKind::Text | FileKind::Table => ExportPayload::Utf8 {
                text: String::from_utf8_lossy(&bytes).into_owned(),
            },
            FileKind::Binary | FileKind::Unknown => ExportPayload::Base64 {
                data: BASE64.encode(&bytes),
            },
        };

        let entry = ExportEntry {
            relative_path: relative_path.to_string(),
            size_bytes: metadata.len(),
            modified_at: modified_at(&metadata),
            kind,
        };
        Ok((entry, payload))
    }

    /// Preview a delimited file as a bounded table.
    ///
    /// The delimiter is sniffed (comma vs tab) from the header line. A row
    /// whose field count disagrees with the header fails the whole preview.
    pub async fn preview(&self, ws: &Workspace, relative_path: &str, max_rows: usize) -> Result<TablePreview> {
        let absolute = self.resolve_file(ws, relative_path).await?;
        let metadata = fs::metadata(&absolute).await?;
        if metadata.len() > self.config.max_read_bytes {
            return Err(ExportError::TooLarge {
                size: metadata.len(),
                limit: self.config.max_read_bytes,
            });
        }

        let bytes = fs::read(&absolute).await?;
        let content = String::from_utf8_lossy(&bytes);
        let mut lines = content.lines();

        let Some(header) = lines.next() else {
            return Err(ExportError::PreviewParse("file is empty".to_string()));
        };
        let delimiter = sniff_delimiter(relative_path, header);
        let columns: Vec<String> = header.split(delimiter).map(|c| c.trim().to_string()).collect();

        let mut rows = Vec::new();
        let mut truncated = false;
        for (index, line) in lines.enumerate() {
            if rows.len() >= max_rows {
                truncated = true;
                break;
            }
            let fields: Vec<String> = line.split(delimiter).map(|c| c.trim().to_string()).collect();
            if fields.len() != columns.len() {
                return Err(ExportError::PreviewParse(format!(
                    "row {} has {} fields, expected {}",
                    index + 1,
                    fields.len(),
                    columns.len()
                )));
            }
            rows.push(fields);
        }

        debug!(file = %relative_path, rows = rows.len(), truncated, "previewed table");
        Ok(TablePreview {
            columns,
            rows,
            truncated,
        })
    }

    async fn resolve_file(&self, ws: &Workspace, relative_path: &str) -> Result<PathBuf> {
        let absolute = sandbox::resolve(ws.root(), relative_path)?;
        if !fs::try_exists(&absolute).await? {
            return Err(ExportError::UnknownFile(relative_path.to_string()));
        }
        Ok(absolute)
    }
}

fn modified_at(metadata: &std::fs::Metadata) -> DateTime<Utc> {
    metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

/// Tab wins for .tsv files or when the header carries more tabs than commas.
fn sniff_delimiter(relative_path: &str, header: &str) -> char {
    if relative_path.to_lowercase().ends_with(".tsv") {
        return '\t';
    }
    let tabs = header.matches('\t').count();
    let commas = header.matches(',').count();
    if tabs > commas { '\t' } else { ',' }
}

/// Extension first; a short content sniff for extensions the table doesn't
/// know. A NUL byte anywhere in the sample means binary.
async fn classify(path: &Path) -> FileKind {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("csv") | Some("tsv") => FileKind::Table,
        Some("r") | Some("rmd") | Some("txt") | Some("md") | Some("json") | Some("log")
        | Some("html") | Some("xml") => FileKind::Text,
        Some("png") | Some("jpg") | Some("jpeg") | Some("gif") | Some("pdf") | Some("rds")
        | Some("rdata") | Some("zip") | Some("gz") | Some("xlsx") => FileKind::Binary,
        _ => sniff_content(path).await,
    }
}

async fn sniff_content(path: &Path) -> FileKind {
    use tokio::io::AsyncReadExt;

    let Ok(mut file) = fs::File::open(path).await else {
        return FileKind::Unknown;
    };
    let mut sample = [0u8; 512];
    let Ok(n) = file.read(&mut sample).await else {
        return FileKind::Unknown;
    };
    if n == 0 {
        return FileKind::Unknown;
    }
    if sample[..n].contains(&0) {
        FileKind::Binary
    } else {
        FileKind::Text
    }
}
