// Integration tests for the tool façade
// This file should be run with cargo test --test test_tools

use rworkd::engine::{Engine, EngineConfig};
use rworkd::exports::{ExportConfig, ExportInspector};
use rworkd::tools::{ServiceContext, Tools};
use rworkd::workspace::{SessionStore, WorkspaceConfig};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

fn tools_with_interpreter(interpreter: Option<PathBuf>) -> Tools {
    let ctx = Arc::new(ServiceContext {
        store: SessionStore::new(WorkspaceConfig::default()),
        engine: Engine::new(EngineConfig {
            interpreter,
            ..Default::default()
        }),
        exports: ExportInspector::new(ExportConfig::default()),
    });
    Tools::init(ctx, &PathBuf::from("does-not-exist/tools.toml"))
}

fn tools() -> Tools {
    tools_with_interpreter(None)
}

async fn call(tools: &Tools, name: &str, args: Value) -> Result<Value, (String, String)> {
    match tools.dispatch(name, args).await {
        Ok(output) => Ok(output.data),
        Err(body) => Err((body.kind, body.message)),
    }
}

#[cfg(unix)]
fn fake_interpreter(dir: &std::path::Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("rscript-fake");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

#[tokio::test]
async fn test_all_tools_registered() {
    let tools = tools();
    let names: Vec<String> = tools
        .definitions()
        .into_iter()
        .map(|d| d.name)
        .collect();

    let expected = [
        "append_r_code",
        "create_r_file",
        "get_state",
        "inspect_r_objects",
        "list_exports",
        "list_r_files",
        "preview_table",
        "read_export",
        "rename_r_file",
        "run_r_expression",
        "run_r_script",
        "set_primary_file",
        "set_workdir",
        "which_interpreter",
        "write_r_code",
    ];
    assert_eq!(names, expected);
}

#[tokio::test]
async fn test_unknown_tool() {
    let tools = tools();
    let (kind, _) = call(&tools, "frobnicate", json!({})).await.unwrap_err();
    assert_eq!(kind, "unknown_tool");
}

#[tokio::test]
async fn test_invalid_arguments() {
    let tools = tools();
    let (kind, message) = call(&tools, "set_workdir", json!({})).await.unwrap_err();
    assert_eq!(kind, "invalid_input");
    assert!(message.contains("set_workdir"));
}

#[tokio::test]
async fn test_get_state_unconfigured() {
    let tools = tools();
    let data = call(&tools, "get_state", Value::Null).await.unwrap();
    assert_eq!(data["configured"], json!(false));
}

#[tokio::test]
async fn test_operations_require_workdir() {
    let tools = tools();
    let (kind, _) = call(
        &tools,
        "create_r_file",
        json!({"relative_path": "model.r"}),
    )
    .await
    .unwrap_err();
    assert_eq!(kind, "not_configured");
}

#[tokio::test]
async fn test_set_workdir_then_state() {
    let dir = TempDir::new().unwrap();
    let tools = tools();

    let data = call(
        &tools,
        "set_workdir",
        json!({"path": dir.path().to_str().unwrap()}),
    )
    .await
    .unwrap();
    assert_eq!(data["primary_file"], json!("agent.r"));

    let state = call(&tools, "get_state", json!({})).await.unwrap();
    assert_eq!(state["configured"], json!(true));
    assert_eq!(state["primary_file"], json!("agent.r"));
    assert!(state["history_total"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn test_file_lifecycle_through_tools() {
    let dir = TempDir::new().unwrap();
    let tools = tools();
    call(&tools, "set_workdir", json!({"path": dir.path().to_str().unwrap()}))
        .await
        .unwrap();

    // Extension normalization on create
    let data = call(
        &tools,
        "create_r_file",
        json!({"relative_path": "model", "template": false}),
    )
    .await
    .unwrap();
    assert_eq!(data["file"]["relative_path"], json!("model.r"));

    // Destructive writes need explicit opt-in every time
    let (kind, _) = call(
        &tools,
        "write_r_code",
        json!({"relative_path": "model.r", "content": "x = 2\n"}),
    )
    .await
    .unwrap_err();
    assert_eq!(kind, "overwrite_protection");

    call(
        &tools,
        "write_r_code",
        json!({"relative_path": "model.r", "content": "x = 2\n", "overwrite": true}),
    )
    .await
    .unwrap();

    call(
        &tools,
        "append_r_code",
        json!({"relative_path": "model.r", "content": "y = 3\n"}),
    )
    .await
    .unwrap();
    let content = std::fs::read_to_string(dir.path().join("model.r")).unwrap();
    assert_eq!(content, "x = 2\ny = 3\n");

    call(
        &tools,
        "set_primary_file",
        json!({"relative_path": "model.r"}),
    )
    .await
    .unwrap();

    // Rename re-points the primary designation
    let data = call(
        &tools,
        "rename_r_file",
        json!({"from": "model.r", "to": "final.r"}),
    )
    .await
    .unwrap();
    assert_eq!(data["primary_updated"], json!(true));

    let state = call(&tools, "get_state", json!({})).await.unwrap();
    assert_eq!(state["primary_file"], json!("final.r"));

    let listing = call(&tools, "list_r_files", json!({})).await.unwrap();
    let names: Vec<&str> = listing["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["relative_path"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"final.r"));
    assert!(!names.contains(&"model.r"));
}

#[tokio::test]
async fn test_path_escape_is_rejected_at_the_facade() {
    let dir = TempDir::new().unwrap();
    let tools = tools();
    call(&tools, "set_workdir", json!({"path": dir.path().to_str().unwrap()}))
        .await
        .unwrap();

    let (kind, _) = call(
        &tools,
        "write_r_code",
        json!({"relative_path": "../evil.r", "content": "x", "overwrite": true}),
    )
    .await
    .unwrap_err();
    assert_eq!(kind, "path_escape");

    let (kind, _) = call(
        &tools,
        "read_export",
        json!({"relative_path": "../../etc/passwd"}),
    )
    .await
    .unwrap_err();
    assert_eq!(kind, "path_escape");
}

#[tokio::test]
async fn test_preview_table_defaults() {
    let dir = TempDir::new().unwrap();
    let tools = tools();
    call(&tools, "set_workdir", json!({"path": dir.path().to_str().unwrap()}))
        .await
        .unwrap();

    std::fs::write(dir.path().join("scores.csv"), "name,score\na,1\nb,2\n").unwrap();
    let data = call(
        &tools,
        "preview_table",
        json!({"relative_path": "scores.csv"}),
    )
    .await
    .unwrap();
    assert_eq!(data["preview"]["columns"], json!(["name", "score"]));
    assert_eq!(data["preview"]["truncated"], json!(false));
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_r_expression_through_tools() {
    let dir = TempDir::new().unwrap();
    let fakes = TempDir::new().unwrap();
    let tools = tools_with_interpreter(Some(fake_interpreter(fakes.path(), "echo computed")));
    call(&tools, "set_workdir", json!({"path": dir.path().to_str().unwrap()}))
        .await
        .unwrap();

    let data = call(
        &tools,
        "run_r_expression",
        json!({"expression": "1 + 1"}),
    )
    .await
    .unwrap();
    assert_eq!(data["exit_code"], json!(0));
    assert!(data["stdout"].as_str().unwrap().contains("computed"));
    assert_eq!(data["timed_out"], json!(false));
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_r_script_defaults_to_primary() {
    let dir = TempDir::new().unwrap();
    let fakes = TempDir::new().unwrap();
    let tools = tools_with_interpreter(Some(fake_interpreter(fakes.path(), "echo \"code:$2\"")));
    call(&tools, "set_workdir", json!({"path": dir.path().to_str().unwrap()}))
        .await
        .unwrap();

    // No relative_path: the scaffolded primary runs
    let data = call(&tools, "run_r_script", json!({})).await.unwrap();
    assert!(data["stdout"].as_str().unwrap().contains("agent.r"));
}

#[tokio::test]
async fn test_run_without_primary_fails() {
    // A pre-existing agent.r means open neither scaffolds nor designates a
    // primary, so a targetless run has nothing to fall back to.
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("agent.r"), "x = 1\n").unwrap();

    let tools = tools_with_interpreter(Some(PathBuf::from("/opt/R/bin/Rscript")));
    let data = call(&tools, "set_workdir", json!({"path": dir.path().to_str().unwrap()}))
        .await
        .unwrap();
    assert_eq!(data["primary_file"], json!(null));

    let (kind, _) = call(&tools, "run_r_script", json!({})).await.unwrap_err();
    assert_eq!(kind, "no_primary_file");
}

#[tokio::test]
async fn test_run_missing_script_fails() {
    let dir = TempDir::new().unwrap();
    let tools = tools_with_interpreter(Some(PathBuf::from("/opt/R/bin/Rscript")));
    call(&tools, "set_workdir", json!({"path": dir.path().to_str().unwrap()}))
        .await
        .unwrap();

    let (kind, _) = call(
        &tools,
        "run_r_script",
        json!({"relative_path": "ghost.r"}),
    )
    .await
    .unwrap_err();
    assert_eq!(kind, "unknown_file");
}

#[tokio::test]
async fn test_which_interpreter_reports_override() {
    let tools = tools_with_interpreter(Some(PathBuf::from("/opt/R/bin/Rscript")));
    let data = call(&tools, "which_interpreter", json!({})).await.unwrap();
    assert_eq!(data["executable"], json!("/opt/R/bin/Rscript"));
    assert_eq!(data["source"], json!("override"));
}

#[tokio::test]
async fn test_description_overrides_from_toml() {
    let dir = TempDir::new().unwrap();
    let toml_path = dir.path().join("tools.toml");
    std::fs::write(&toml_path, "[get_state]\ndescription = \"custom words\"\n").unwrap();

    let ctx = Arc::new(ServiceContext {
        store: SessionStore::new(WorkspaceConfig::default()),
        engine: Engine::new(EngineConfig::default()),
        exports: ExportInspector::new(ExportConfig::default()),
    });
    let tools = Tools::init(ctx, &toml_path);

    let definition = tools
        .definitions()
        .into_iter()
        .find(|d| d.name == "get_state")
        .unwrap();
    assert_eq!(definition.description, "custom words");
}
