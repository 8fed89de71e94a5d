// Integration tests for the engine module
// This file should be run with cargo test --test test_engine
//
// A stand-in interpreter script keeps these tests independent of an R
// installation; the engine only sees an executable taking the same argv.

#![cfg(unix)]

use rworkd::engine::{Engine, EngineConfig, EngineError, ExecTarget, ExecutionRequest, ExecutionStatus};
use rworkd::scripts::registry;
use rworkd::workspace::{SessionStore, Workspace, WorkspaceConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .init();
    });
}

fn workspace() -> (TempDir, SessionStore, Arc<Workspace>) {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(WorkspaceConfig::default());
    let ws = store.open(dir.path()).unwrap();
    (dir, store, ws)
}

fn fake_interpreter(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("rscript-fake");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

fn engine_with(interpreter: PathBuf, tune: impl FnOnce(&mut EngineConfig)) -> Engine {
    let mut config = EngineConfig {
        interpreter: Some(interpreter),
        ..Default::default()
    };
    tune(&mut config);
    Engine::new(config)
}

#[tokio::test]
async fn test_expression_captures_both_streams() {
    let (_dir, _store, ws) = workspace();
    let fakes = TempDir::new().unwrap();
    let engine = engine_with(
        fake_interpreter(fakes.path(), "echo hello; echo oops >&2"),
        |_| {},
    );

    let (result, warning) = engine
        .execute(&ws, ExecutionRequest::expression("1 + 1"))
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::Completed);
    assert_eq!(result.exit_code, Some(0));
    assert!(result.stdout.contains("hello"));
    assert!(result.stderr.contains("oops"));
    assert!(!result.timed_out);
    assert!(warning.is_none());

    // The result is summarized into session history
    let state = ws.snapshot().await;
    assert_eq!(state.history.last().unwrap().operation, "run_r_expression");
}

#[tokio::test]
async fn test_nonzero_exit_is_normal_completion() {
    let (_dir, _store, ws) = workspace();
    let fakes = TempDir::new().unwrap();
    let engine = engine_with(fake_interpreter(fakes.path(), "echo bad >&2; exit 3"), |_| {});

    let (result, _) = engine
        .execute(&ws, ExecutionRequest::expression("stop('bad')"))
        .await
        .unwrap();

    assert_eq!(result.status, ExecutionStatus::Completed);
    assert_eq!(result.exit_code, Some(3));
    assert!(!result.timed_out);
}

#[tokio::test]
async fn test_script_target_runs_resolved_file() {
    let (_dir, _store, ws) = workspace();
    registry::write(&ws, "job.r", "x = 1\n", false).await.unwrap();

    let fakes = TempDir::new().unwrap();
    let engine = engine_with(fake_interpreter(fakes.path(), "echo \"ran:$1\""), |_| {});

    let mut request = ExecutionRequest::script("job.r");
    request.save_image = false;
    let (result, _) = engine.execute(&ws, request).await.unwrap();

    assert!(result.stdout.contains("ran:"));
    assert!(result.stdout.contains("job.r"));
}

#[tokio::test]
async fn test_save_image_wraps_script() {
    let (_dir, _store, ws) = workspace();
    registry::write(&ws, "job.r", "x = 1\n", false).await.unwrap();

    let fakes = TempDir::new().unwrap();
    let engine = engine_with(
        fake_interpreter(fakes.path(), "if [ \"$1\" = \"-e\" ]; then echo \"code:$2\"; fi"),
        |_| {},
    );

    let (result, _) = engine
        .execute(&ws, ExecutionRequest::script("job.r"))
        .await
        .unwrap();

    assert!(result.stdout.contains("source(\"job.r\")"));
    assert!(result.stdout.contains("save.image(\".rworkd/last_session.RData\")"));
}

#[tokio::test]
async fn test_unknown_script_fails_before_spawn() {
    let (_dir, _store, ws) = workspace();
    let fakes = TempDir::new().unwrap();
    let engine = engine_with(fake_interpreter(fakes.path(), "echo never"), |_| {});

    let err = engine
        .execute(&ws, ExecutionRequest::script("ghost.r"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Script(_)));
}

#[tokio::test]
async fn test_timeout_kills_subprocess() {
    let (_dir, _store, ws) = workspace();
    let fakes = TempDir::new().unwrap();
    let engine = engine_with(fake_interpreter(fakes.path(), "sleep 5; echo survived"), |_| {});

    let mut request = ExecutionRequest::expression("Sys.sleep(5)");
    request.timeout_secs = Some(1);
    let started = std::time::Instant::now();
    let (result, _) = engine.execute(&ws, request).await.unwrap();

    assert_eq!(result.status, ExecutionStatus::TimedOut);
    assert!(result.timed_out);
    assert_eq!(result.exit_code, None);
    assert!(!result.stdout.contains("survived"));
    // The whole process group is gone well before the sleep would finish
    assert!(started.elapsed().as_secs() < 5);
}

#[tokio::test]
async fn test_output_truncated_with_marker() {
    let (_dir, _store, ws) = workspace();
    let fakes = TempDir::new().unwrap();
    let engine = engine_with(
        fake_interpreter(fakes.path(), "head -c 300 /dev/zero | tr '\\0' 'a'"),
        |config| config.max_output_bytes = 64,
    );

    let (result, _) = engine
        .execute(&ws, ExecutionRequest::expression("cat(x)"))
        .await
        .unwrap();

    assert!(result.stdout_truncated);
    assert!(result.stdout.ends_with("...truncated"));
    assert!(result.stdout.len() < 300);
}

#[tokio::test]
async fn test_busy_after_bounded_wait() {
    let (_dir, _store, ws) = workspace();
    let fakes = TempDir::new().unwrap();
    let engine = Arc::new(engine_with(
        fake_interpreter(fakes.path(), "sleep 3"),
        |config| config.lock_wait_secs = 1,
    ));

    let long_ws = ws.clone();
    let long_engine = engine.clone();
    let long_run = tokio::spawn(async move {
        long_engine
            .execute(&long_ws, ExecutionRequest::expression("Sys.sleep(3)"))
            .await
    });
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    let err = engine
        .execute(&ws, ExecutionRequest::expression("1"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Busy { .. }));

    long_run.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_same_root_executions_serialize_in_arrival_order() {
    let (_dir, _store, ws) = workspace();
    let fakes = TempDir::new().unwrap();
    let engine = Arc::new(engine_with(fake_interpreter(fakes.path(), "sleep 1"), |config| {
        config.lock_wait_secs = 30;
    }));

    let first_ws = ws.clone();
    let first_engine = engine.clone();
    let first = tokio::spawn(async move {
        first_engine
            .execute(&first_ws, ExecutionRequest::expression("a"))
            .await
    });
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    let second_ws = ws.clone();
    let second_engine = engine.clone();
    let second = tokio::spawn(async move {
        second_engine
            .execute(&second_ws, ExecutionRequest::expression("b"))
            .await
    });

    let (first_result, _) = first.await.unwrap().unwrap();
    let (second_result, _) = second.await.unwrap().unwrap();

    // Never both running: the second starts only after the first finished
    assert!(first_result.started_at < second_result.started_at);
    let first_end =
        first_result.started_at + chrono::Duration::milliseconds(first_result.duration_ms as i64);
    assert!(second_result.started_at >= first_end - chrono::Duration::milliseconds(50));
}

#[tokio::test]
async fn test_changed_files_reported() {
    let (_dir, _store, ws) = workspace();
    std::fs::write(ws.root().join("static.txt"), "untouched").unwrap();

    let fakes = TempDir::new().unwrap();
    let engine = engine_with(
        fake_interpreter(fakes.path(), "echo a,b > result.csv"),
        |_| {},
    );

    let (result, _) = engine
        .execute(&ws, ExecutionRequest::expression("write.csv(x)"))
        .await
        .unwrap();

    assert!(result.changed_files.contains(&"result.csv".to_string()));
    assert!(!result.changed_files.contains(&"static.txt".to_string()));
}

#[tokio::test]
async fn test_missing_interpreter_is_engine_fault() {
    let (_dir, _store, ws) = workspace();
    let engine = engine_with(PathBuf::from("/nonexistent/rscript"), |_| {});

    let err = engine
        .execute(&ws, ExecutionRequest::expression("1"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InterpreterNotFound));
}

#[tokio::test]
async fn test_inspect_requires_saved_session() {
    let (_dir, _store, ws) = workspace();
    let fakes = TempDir::new().unwrap();
    let engine = engine_with(fake_interpreter(fakes.path(), "echo never"), |_| {});

    let err = engine.inspect_objects(&ws).await.unwrap_err();
    assert!(matches!(err, EngineError::NoSession));
}

#[tokio::test]
async fn test_inspect_parses_probe_lines() {
    let (_dir, _store, ws) = workspace();
    std::fs::write(ws.state_dir().join("last_session.RData"), b"fake").unwrap();

    let fakes = TempDir::new().unwrap();
    let engine = engine_with(
        fake_interpreter(fakes.path(), "printf 'x\\tnumeric len=3\\nfit\\tlm len=12\\n'"),
        |_| {},
    );

    let (objects, _) = engine.inspect_objects(&ws).await.unwrap();
    assert_eq!(objects.len(), 2);
    assert_eq!(objects["x"], "numeric len=3");
    assert_eq!(objects["fit"], "lm len=12");
}

#[tokio::test]
async fn test_inspect_probe_failure_surfaces_stderr() {
    let (_dir, _store, ws) = workspace();
    std::fs::write(ws.state_dir().join("last_session.RData"), b"fake").unwrap();

    let fakes = TempDir::new().unwrap();
    let engine = engine_with(
        fake_interpreter(fakes.path(), "echo 'cannot load image' >&2; exit 1"),
        |_| {},
    );

    match engine.inspect_objects(&ws).await.unwrap_err() {
        EngineError::Probe(stderr) => assert!(stderr.contains("cannot load image")),
        other => panic!("expected probe failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_distinct_roots_run_in_parallel() {
    let (_dir_a, _store_a, ws_a) = workspace();
    let (_dir_b, _store_b, ws_b) = workspace();
    let fakes = TempDir::new().unwrap();
    let engine = Arc::new(engine_with(fake_interpreter(fakes.path(), "sleep 1"), |_| {}));

    let started = std::time::Instant::now();
    let engine_a = engine.clone();
    let engine_b = engine.clone();
    let (a, b) = tokio::join!(
        engine_a.execute(&ws_a, ExecutionRequest::expression("a")),
        engine_b.execute(&ws_b, ExecutionRequest::expression("b")),
    );
    a.unwrap();
    b.unwrap();

    // Serialized runs would need >= 2s; parallel ones finish together
    assert!(started.elapsed().as_millis() < 1800);
}

#[tokio::test]
async fn test_expression_argv_reaches_interpreter() {
    let (_dir, _store, ws) = workspace();
    let fakes = TempDir::new().unwrap();
    let engine = engine_with(
        fake_interpreter(fakes.path(), "echo \"argv:$1|$2\""),
        |_| {},
    );

    let (result, _) = engine
        .execute(
            &ws,
            ExecutionRequest {
                target: ExecTarget::Expression("mean(c(1, 2))".to_string()),
                args: Vec::new(),
                timeout_secs: None,
                save_image: false,
            },
        )
        .await
        .unwrap();

    // The expression travels as a discrete argv element, never a shell line
    assert!(result.stdout.contains("argv:-e|mean(c(1, 2))"));
}
