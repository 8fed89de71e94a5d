use clap::Parser;
use rworkd::comm::{CommConfig, CommServer};
use rworkd::engine::{Engine, EngineConfig};
use rworkd::exports::{ExportConfig, ExportInspector};
use rworkd::tools::{ServiceContext, Tools};
use rworkd::workspace::{SessionStore, WorkspaceConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{Level, error, info, warn};
use tracing_subscriber::fmt;

/// Daemon arguments
#[derive(Debug, Parser)]
#[command(name = "rworkd")]
#[command(about = "Sandboxed R script execution daemon")]
struct Args {
    /// Workspace root to open at startup
    #[arg(short, long)]
    workdir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: Level,

    /// Tool description overrides
    #[arg(long, default_value = "tools.toml")]
    tools_toml: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logs go to stderr: stdout carries the response protocol.
    fmt()
        .with_max_level(args.log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting rworkd daemon...");

    let comm_config = CommConfig::from_env();
    let engine_config = EngineConfig::from_env();
    let export_config = ExportConfig::from_env();

    info!(
        default_timeout_secs = engine_config.default_timeout_secs,
        max_output_bytes = engine_config.max_output_bytes,
        lock_wait_secs = engine_config.lock_wait_secs,
        "Configuration loaded"
    );

    let ctx = Arc::new(ServiceContext {
        store: SessionStore::new(WorkspaceConfig::default()),
        engine: Engine::new(engine_config),
        exports: ExportInspector::new(export_config),
    });

    if let Some(workdir) = &args.workdir {
        match ctx.store.open(workdir) {
            Ok(ws) => info!(root = %ws.root().display(), "workspace preconfigured"),
            Err(e) => warn!(error = %e, "failed to open startup workspace"),
        }
    }

    let tools = Arc::new(Tools::init(ctx, &args.tools_toml));
    info!(tools = tools.definitions().len(), "Tools initialized");

    let server = CommServer::new(tools, comm_config);

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!(error = %e, "Transport error");
                std::process::exit(1);
            }
        }
        _ = async { signal::ctrl_c().await.ok() } => {
            info!("Received shutdown signal");
        }
    }

    info!("Goodbye!");
    Ok(())
}
