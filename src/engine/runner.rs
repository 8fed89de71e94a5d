// Execution engine implementation
//
// Serializes interpreter invocations per workspace, captures bounded output,
// and enforces wall-clock timeouts with process-group termination so an
// expired run never leaves orphans holding workspace state.

use super::config::EngineConfig;
use super::error::{EngineError, Result};
use super::inspect::{escape_r_string, parse_probe_output, probe_script};
use super::interpreter;
use super::types::{ExecTarget, ExecutionRequest, ExecutionResult, ExecutionStatus};
use crate::scripts::registry;
use crate::workspace::Workspace;
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant, SystemTime};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Rscript execution engine
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The interpreter binary: explicit override, else the process-wide probe.
    pub fn interpreter_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.config.interpreter {
            return Ok(path.clone());
        }
        interpreter::find()
            .map(|i| i.path.clone())
            .ok_or(EngineError::InterpreterNotFound)
    }

    /// Execute a script or inline expression in the workspace.
    ///
    /// Returns the immutable result plus an optional non-fatal warning from
    /// the history persist. A non-zero exit code is a normal completion.
    pub async fn execute(
        &self,
        ws: &Workspace,
        request: ExecutionRequest,
    ) -> Result<(ExecutionResult, Option<String>)> {
        let op = match request.target {
            ExecTarget::Script(_) => "run_r_script",
            ExecTarget::Expression(_) => "run_r_expression",
        };
        self.run(ws, request, op).await
    }

    /// Enumerate bindings in the saved workspace image as a name -> summary
    /// map. Implemented as a specialized execution of an internally generated
    /// probe, serialized like any other run.
    pub async fn inspect_objects(
        &self,
        ws: &Workspace,
    ) -> Result<(BTreeMap<String, String>, Option<String>)> {
        let image = ws.state_dir().join(&self.config.image_file_name);
        if !image.exists() {
            return Err(EngineError::NoSession);
        }

        let mut request = ExecutionRequest::expression(probe_script(&self.image_relative(ws)));
        request.timeout_secs = Some(60);
        let (result, warning) = self.run(ws, request, "inspect_r_objects").await?;

        if result.timed_out {
            return Err(EngineError::Probe("probe timed out".to_string()));
        }
        if result.exit_code != Some(0) {
            return Err(EngineError::Probe(result.stderr));
        }
        Ok((parse_probe_output(&result.stdout), warning))
    }

    async fn run(
        &self,
        ws: &Workspace,
        request: ExecutionRequest,
        op: &str,
    ) -> Result<(ExecutionResult, Option<String>)> {
        let interpreter = self.interpreter_path()?;
        let argv = self.build_argv(ws, &request).await?;
        let timeout_secs = self.config.effective_timeout(request.timeout_secs);

        // Execution lock: held from spawn through teardown. A bounded wait
        // keeps callers from queuing indefinitely behind a long run.
        let wait = Duration::from_secs(self.config.lock_wait_secs);
        let _guard = ws
            .lock_for_execution(wait)
            .await
            .ok_or(EngineError::Busy {
                waited_secs: self.config.lock_wait_secs,
            })?;

        let files_before = scan_files(ws);

        debug!(
            interpreter = %interpreter.display(),
            argv = ?argv,
            timeout_secs,
            "spawning interpreter"
        );

        let mut command = Command::new(&interpreter);
        command
            .args(&argv)
            .current_dir(ws.root())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EngineError::InterpreterNotFound
            } else {
                EngineError::Spawn(e.to_string())
            }
        })?;

        let started_at = Utc::now();
        let start = Instant::now();
        let pid = child.id();

        let cap = self.config.max_output_bytes;
        let stdout_task = tokio::spawn(read_capped(child.stdout.take().expect("piped"), cap));
        let stderr_task = tokio::spawn(read_capped(child.stderr.take().expect("piped"), cap));

        let (exit_code, timed_out) =
            match timeout(Duration::from_secs(timeout_secs), child.wait()).await {
                Ok(Ok(status)) => (Some(status.code().unwrap_or(-1)), false),
                Ok(Err(e)) => return Err(EngineError::Io(e)),
                Err(_) => {
                    warn!(timeout_secs, pid = ?pid, "execution timed out, killing process group");
                    if let Some(pid) = pid {
                        kill_process_group(pid);
                    }
                    let _ = child.kill().await;
                    (None, true)
                }
            };

        let (stdout, stdout_truncated) = stdout_task.await.unwrap_or_default();
        let (stderr, stderr_truncated) = stderr_task.await.unwrap_or_default();
        let duration_ms = start.elapsed().as_millis() as u64;
        let changed_files = diff_files(&files_before, &scan_files(ws));

        let result = ExecutionResult {
            status: if timed_out {
                ExecutionStatus::TimedOut
            } else {
                ExecutionStatus::Completed
            },
            exit_code,
            stdout,
            stderr,
            stdout_truncated,
            stderr_truncated,
            duration_ms,
            started_at,
            timed_out,
            changed_files,
        };

        info!(
            op,
            exit_code = ?result.exit_code,
            timed_out = result.timed_out,
            duration_ms = result.duration_ms,
            changed_files = result.changed_files.len(),
            "execution finished"
        );

        let warning = ws.append_history(op, result.summary()).await;
        Ok((result, warning))
    }

    async fn build_argv(&self, ws: &Workspace, request: &ExecutionRequest) -> Result<Vec<String>> {
        let mut argv = match &request.target {
            ExecTarget::Script(name) => {
                let (relative, absolute) = registry::resolve_tracked(ws, name).await?;
                if request.save_image {
                    // Wrap the run so bindings survive into the saved image
                    // for later inspection.
                    vec![
                        "-e".to_string(),
                        format!(
                            "source(\"{}\"); save.image(\"{}\")",
                            escape_r_string(&relative),
                            escape_r_string(&self.image_relative(ws))
                        ),
                    ]
                } else {
                    vec![absolute.to_string_lossy().into_owned()]
                }
            }
            ExecTarget::Expression(expr) => vec!["-e".to_string(), expr.clone()],
        };
        argv.extend(request.args.iter().cloned());
        Ok(argv)
    }

    /// Image path relative to the workspace root, for embedding in R code
    /// that runs with cwd = root.
    fn image_relative(&self, ws: &Workspace) -> String {
        let dir = ws
            .state_dir()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{}/{}", dir, self.config.image_file_name)
    }
}

/// Read a stream into a bounded buffer. Past the cap the remainder is drained
/// (so the child never blocks on a full pipe) and an explicit marker is
/// appended instead of silently dropping bytes.
async fn read_capped<R: AsyncRead + Unpin>(mut stream: R, cap: usize) -> (String, bool) {
    let mut buf = Vec::with_capacity(8192);
    let mut limited = (&mut stream).take(cap as u64 + 1);
    let _ = limited.read_to_end(&mut buf).await;

    let truncated = buf.len() > cap;
    if truncated {
        buf.truncate(cap);
        let _ = tokio::io::copy(&mut stream, &mut tokio::io::sink()).await;
    }

    let mut text = String::from_utf8_lossy(&buf).into_owned();
    if truncated {
        text.push_str("\n...truncated");
    }
    (text, truncated)
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;
    if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        warn!(pid, error = %e, "failed to kill process group");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}

/// Top-level file names and mtimes, for changed-file reporting. The state
/// directory and other dotfiles are not artifacts.
fn scan_files(ws: &Workspace) -> BTreeMap<String, SystemTime> {
    let mut files = BTreeMap::new();
    let Ok(entries) = std::fs::read_dir(ws.root()) else {
        return files;
    };
    for entry in entries.flatten() {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        let Ok(metadata) = entry.metadata() else { continue };
        if !metadata.is_file() {
            continue;
        }
        if let Ok(modified) = metadata.modified() {
            files.insert(name, modified);
        }
    }
    files
}

fn diff_files(
    before: &BTreeMap<String, SystemTime>,
    after: &BTreeMap<String, SystemTime>,
) -> Vec<String> {
    after
        .iter()
        .filter(|(name, mtime)| match before.get(*name) {
            Some(previous) => previous < mtime,
            None => true,
        })
        .map(|(name, _)| name.clone())
        .collect()
}
