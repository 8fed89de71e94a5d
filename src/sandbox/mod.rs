// Sandbox module - path containment for workspace operations

pub mod error;

pub use error::{Result, SandboxError};

use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Resolve a caller-supplied path against a workspace root.
///
/// `root` must already be absolute and canonical (the session store guarantees
/// this). The returned path is the lexically-normalized join of `root` and
/// `user_path`, verified to stay inside `root` even after following symlinks.
/// Every filesystem access in the crate goes through here first.
pub fn resolve(root: &Path, user_path: &str) -> Result<PathBuf> {
    if user_path.is_empty() {
        return Err(SandboxError::Escape(user_path.to_string()));
    }

    let candidate = Path::new(user_path);
    if candidate.is_absolute() {
        return Err(SandboxError::Absolute(user_path.to_string()));
    }

    // Lexical normalization: walk components, popping on "..". A pop past the
    // root is an escape no matter what the filesystem says.
    let mut depth: Vec<&std::ffi::OsStr> = Vec::new();
    for component in candidate.components() {
        match component {
            Component::Normal(part) => depth.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth.pop().is_none() {
                    return Err(SandboxError::Escape(user_path.to_string()));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(SandboxError::Absolute(user_path.to_string()));
            }
        }
    }
    if depth.is_empty() {
        return Err(SandboxError::Escape(user_path.to_string()));
    }

    let mut joined = root.to_path_buf();
    for part in &depth {
        joined.push(part);
    }

    // A symlink inside the root may point outside it. Canonicalize the
    // existing prefix of the target and re-check containment.
    let resolved = canonicalize_existing_prefix(&joined)?;
    if !resolved.starts_with(root) {
        debug!(path = %user_path, resolved = %resolved.display(), "path escapes root after symlink resolution");
        return Err(SandboxError::Escape(user_path.to_string()));
    }

    Ok(joined)
}

/// Canonicalize the deepest existing ancestor of `path` and re-append the
/// non-existing remainder, so containment can be checked for paths that are
/// about to be created.
fn canonicalize_existing_prefix(path: &Path) -> Result<PathBuf> {
    let mut existing = path;
    let mut remainder: Vec<&std::ffi::OsStr> = Vec::new();

    loop {
        match existing.symlink_metadata() {
            Ok(_) => break,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let Some(name) = existing.file_name() else {
                    break;
                };
                remainder.push(name);
                existing = existing.parent().unwrap_or(Path::new("/"));
            }
            Err(e) => return Err(SandboxError::Io(e)),
        }
    }

    let mut resolved = existing.canonicalize()?;
    for part in remainder.iter().rev() {
        resolved.push(part);
    }
    Ok(resolved)
}
