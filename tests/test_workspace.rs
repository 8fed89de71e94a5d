// Integration tests for the workspace module
// This file should be run with cargo test --test test_workspace

use rworkd::scripts::registry;
use rworkd::workspace::{SessionStore, WorkspaceConfig, WorkspaceError};
use std::sync::Arc;
use tempfile::tempdir;

fn store() -> SessionStore {
    SessionStore::new(WorkspaceConfig::default())
}

#[tokio::test]
async fn test_open_initializes_fresh_workspace() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("analysis");

    let ws = store().open(&root).unwrap();

    assert!(ws.root().is_dir());
    assert!(ws.state_dir().join("state.json").is_file());
    // A fresh root gets the scaffolded default primary script
    let state = ws.snapshot().await;
    assert_eq!(state.primary_file.as_deref(), Some("agent.r"));
    assert!(ws.root().join("agent.r").is_file());
}

#[tokio::test]
async fn test_open_is_idempotent_per_root() {
    let dir = tempdir().unwrap();
    let store = store();

    let first = store.open(dir.path()).unwrap();
    let second = store.open(dir.path()).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_current_before_open_fails() {
    let err = store().current().unwrap_err();
    assert!(matches!(err, WorkspaceError::NotConfigured));
}

#[tokio::test]
async fn test_get_looks_up_open_roots_only() {
    let dir = tempdir().unwrap();
    let other = tempdir().unwrap();
    let store = store();

    let opened = store.open(dir.path()).unwrap();
    let found = store.get(dir.path()).unwrap();
    assert!(Arc::ptr_eq(&opened, &found));

    let err = store.get(other.path()).unwrap_err();
    assert!(matches!(err, WorkspaceError::NotConfigured));
}

#[tokio::test]
async fn test_state_survives_reload() {
    let dir = tempdir().unwrap();

    {
        let store = store();
        let ws = store.open(dir.path()).unwrap();
        registry::write(&ws, "model.r", "x = 1\n", false).await.unwrap();
        registry::set_primary(&ws, "model.r").await.unwrap();
        assert!(ws.append_history("write_r_code", "file=model.r").await.is_none());
    }

    // A fresh store simulates a daemon restart
    let store = store();
    let ws = store.open(dir.path()).unwrap();
    let state = ws.snapshot().await;

    assert_eq!(state.primary_file.as_deref(), Some("model.r"));
    // set_workdir scaffold writes no history; the explicit appends survive
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.history[0].operation, "write_r_code");
}

#[tokio::test]
async fn test_corrupt_state_fails_open() {
    let dir = tempdir().unwrap();
    store().open(dir.path()).unwrap();

    let state_file = dir.path().join(".rworkd/state.json");
    std::fs::write(&state_file, "{ not json").unwrap();

    let err = store().open(dir.path()).unwrap_err();
    assert!(matches!(err, WorkspaceError::CorruptState(_)));
    // The unreadable record is left in place, never silently discarded
    assert_eq!(std::fs::read_to_string(&state_file).unwrap(), "{ not json");
}

#[tokio::test]
async fn test_open_rejects_file_root() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("not_a_dir");
    std::fs::write(&file, "x").unwrap();

    let err = store().open(&file).unwrap_err();
    assert!(matches!(err, WorkspaceError::DirectoryCreate(_)));
}

#[tokio::test]
async fn test_history_appends_in_order() {
    let dir = tempdir().unwrap();
    let store = store();
    let ws = store.open(dir.path()).unwrap();

    ws.append_history("run_r_script", "exit_code=0").await;
    ws.append_history("run_r_script", "exit_code=1").await;

    let state = ws.snapshot().await;
    assert_eq!(state.history.len(), 2);
    assert!(state.history[0].at <= state.history[1].at);
    assert_eq!(state.history[1].outcome, "exit_code=1");
}
