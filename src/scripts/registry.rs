// Script registry operations
//
// The filesystem is the source of truth: a tracked script is a file with an
// R extension whose path resolves inside the workspace root. Every mutating
// operation resolves all of its endpoints through the sandbox before touching
// storage, so a resolution failure leaves no partial effect.

use super::error::{Result, ScriptError};
use super::scaffold::SCRIPT_SCAFFOLD;
use super::types::ScriptFile;
use crate::sandbox;
use crate::workspace::Workspace;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info};

/// Normalize a caller-supplied script name: names without an R extension get
/// ".r" appended before sandbox resolution.
pub fn normalize_name(name: &str) -> Result<String> {
    if name.trim().is_empty() {
        return Err(ScriptError::InvalidName(name.to_string()));
    }
    if has_r_extension(name) {
        Ok(name.to_string())
    } else {
        Ok(format!("{}.r", name))
    }
}

fn has_r_extension(name: &str) -> bool {
    name.ends_with(".r") || name.ends_with(".R")
}

/// Resolve a script name to (normalized relative path, absolute path),
/// requiring the file to exist.
pub async fn resolve_tracked(ws: &Workspace, name: &str) -> Result<(String, PathBuf)> {
    let relative = normalize_name(name)?;
    let absolute = sandbox::resolve(ws.root(), &relative)?;
    if !fs::try_exists(&absolute).await? {
        return Err(ScriptError::UnknownFile(relative));
    }
    Ok((relative, absolute))
}

/// Create a new script. Fails when the resolved path already exists; the
/// registry never silently overwrites.
pub async fn create(ws: &Workspace, name: &str, template: bool) -> Result<ScriptFile> {
    let relative = normalize_name(name)?;
    let absolute = sandbox::resolve(ws.root(), &relative)?;

    if fs::try_exists(&absolute).await? {
        return Err(ScriptError::AlreadyExists(relative));
    }
    if let Some(parent) = absolute.parent() {
        fs::create_dir_all(parent).await?;
    }

    let content = if template { SCRIPT_SCAFFOLD } else { "" };
    fs::write(&absolute, content).await?;
    info!(file = %relative, template = template, "created script");

    let metadata = fs::metadata(&absolute).await?;
    let is_primary = ws.primary_file().await.as_deref() == Some(relative.as_str());
    Ok(ScriptFile::from_metadata(relative, &metadata, is_primary))
}

/// Replace a script's content. Destructive writes require explicit opt-in:
/// an existing target with `overwrite=false` fails and leaves the file's
/// bytes unchanged.
pub async fn write(ws: &Workspace, name: &str, content: &str, overwrite: bool) -> Result<ScriptFile> {
    let relative = normalize_name(name)?;
    let absolute = sandbox::resolve(ws.root(), &relative)?;

    if fs::try_exists(&absolute).await? && !overwrite {
        return Err(ScriptError::OverwriteProtection(relative));
    }
    if let Some(parent) = absolute.parent() {
        fs::create_dir_all(parent).await?;
    }

    fs::write(&absolute, content).await?;
    debug!(file = %relative, bytes = content.len(), overwrite = overwrite, "wrote script");

    let metadata = fs::metadata(&absolute).await?;
    let is_primary = ws.primary_file().await.as_deref() == Some(relative.as_str());
    Ok(ScriptFile::from_metadata(relative, &metadata, is_primary))
}

/// Append content to a tracked script, inserting a newline separator when the
/// existing content lacks a trailing one. Returns the number of bytes appended.
pub async fn append(ws: &Workspace, name: &str, content: &str) -> Result<u64> {
    let (relative, absolute) = resolve_tracked(ws, name).await?;

    let existing = fs::read_to_string(&absolute).await?;
    let mut payload = String::new();
    if !existing.is_empty() && !existing.ends_with('\n') {
        payload.push('\n');
    }
    payload.push_str(content);

    let mut combined = existing;
    combined.push_str(&payload);
    fs::write(&absolute, combined).await?;
    debug!(file = %relative, bytes = payload.len(), "appended to script");
    Ok(payload.len() as u64)
}

/// Rename a script. Both endpoints resolve through the sandbox before any
/// mutation; the primary designation follows the file atomically.
pub async fn rename(ws: &Workspace, from: &str, to: &str) -> Result<bool> {
    let from_relative = normalize_name(from)?;
    let to_relative = normalize_name(to)?;
    let from_absolute = sandbox::resolve(ws.root(), &from_relative)?;
    let to_absolute = sandbox::resolve(ws.root(), &to_relative)?;

    if !fs::try_exists(&from_absolute).await? {
        return Err(ScriptError::UnknownFile(from_relative));
    }
    if fs::try_exists(&to_absolute).await? {
        return Err(ScriptError::AlreadyExists(to_relative));
    }
    if let Some(parent) = to_absolute.parent() {
        fs::create_dir_all(parent).await?;
    }

    fs::rename(&from_absolute, &to_absolute).await?;

    let primary_updated = ws.primary_file().await.as_deref() == Some(from_relative.as_str());
    if primary_updated {
        ws.set_primary(Some(to_relative.clone())).await?;
    }
    info!(from = %from_relative, to = %to_relative, primary_updated, "renamed script");
    Ok(primary_updated)
}

/// Designate a tracked script as the workspace's primary file.
pub async fn set_primary(ws: &Workspace, name: &str) -> Result<String> {
    let (relative, _) = resolve_tracked(ws, name).await?;
    ws.set_primary(Some(relative.clone())).await?;
    info!(file = %relative, "set primary script");
    Ok(relative)
}

/// List tracked scripts at the top level of the root, ordered by relative path.
pub async fn list(ws: &Workspace) -> Result<Vec<ScriptFile>> {
    let primary = ws.primary_file().await;
    let mut scripts = Vec::new();

    let mut entries = fs::read_dir(ws.root()).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !has_r_extension(name) {
            continue;
        }
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        let is_primary = primary.as_deref() == Some(name);
        scripts.push(ScriptFile::from_metadata(
            name.to_string(),
            &metadata,
            is_primary,
        ));
    }

    scripts.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(scripts)
}
