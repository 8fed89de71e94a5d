// Interpreter discovery
//
// Resolved once per process lifetime and cached; absence is reported per
// call, never fatal to the service.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

/// A discovered R interpreter
#[derive(Debug, Clone, Serialize)]
pub struct Interpreter {
    /// Preferred binary (Rscript when available, R otherwise)
    pub path: PathBuf,
    /// Every candidate found during the probe
    pub alternatives: Vec<PathBuf>,
}

static PROBE: OnceLock<Option<Interpreter>> = OnceLock::new();

/// The process-wide cached probe result.
pub fn find() -> Option<&'static Interpreter> {
    PROBE.get_or_init(probe).as_ref()
}

fn probe() -> Option<Interpreter> {
    let mut candidates = Vec::new();
    for name in ["Rscript", "R"] {
        candidates.extend(search(name));
    }
    match candidates.first() {
        Some(path) => {
            info!(path = %path.display(), "R interpreter found");
            Some(Interpreter {
                path: path.clone(),
                alternatives: candidates,
            })
        }
        None => {
            debug!("no R interpreter found on PATH or well-known locations");
            None
        }
    }
}

fn search(binary: &str) -> Vec<PathBuf> {
    let mut found = Vec::new();

    if let Some(paths) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&paths) {
            push_if_executable(&mut found, dir.join(binary));
        }
    }

    // Common install locations outside PATH
    let mut well_known = vec![
        PathBuf::from("/usr/local/bin"),
        PathBuf::from("/opt/homebrew/bin"),
        PathBuf::from("/Library/Frameworks/R.framework/Resources/bin"),
    ];
    if let Some(home) = dirs::home_dir() {
        well_known.push(home.join(".local/bin"));
    }
    for dir in well_known {
        push_if_executable(&mut found, dir.join(binary));
    }

    found
}

fn push_if_executable(found: &mut Vec<PathBuf>, candidate: PathBuf) {
    if found.contains(&candidate) {
        return;
    }
    if is_executable(&candidate) {
        found.push(candidate);
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
