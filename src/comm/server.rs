// Stdio server: read requests, dispatch concurrently, write responses

use super::config::CommConfig;
use super::error::{CommError, Result};
use super::protocol::{decode_request, encode_failure, encode_success};
use crate::tools::{ErrorBody, Tools};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Comm server - dispatches JSON-line tool calls from stdin
pub struct CommServer {
    tools: Arc<Tools>,
    config: CommConfig,
}

impl CommServer {
    pub fn new(tools: Arc<Tools>, config: CommConfig) -> Self {
        Self { tools, config }
    }

    /// Run until stdin closes. Each request runs on its own task, so a long
    /// execution never blocks other tool calls; responses are funneled
    /// through one writer task to keep stdout lines whole.
    pub async fn run(self) -> Result<()> {
        let (tx, mut rx) = mpsc::channel::<String>(self.config.channel_capacity);

        let writer = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            while let Some(line) = rx.recv().await {
                if stdout.write_all(line.as_bytes()).await.is_err()
                    || stdout.write_all(b"\n").await.is_err()
                    || stdout.flush().await.is_err()
                {
                    error!("failed to write response to stdout");
                    break;
                }
            }
        });

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if line.len() > self.config.max_line_bytes {
                warn!(bytes = line.len(), "dropping oversized request line");
                let err = CommError::LineTooLarge(line.len());
                let body = ErrorBody::new("invalid_input", err.to_string());
                send(&tx, encode_failure(&Value::Null, &body)).await?;
                continue;
            }

            let tools = self.tools.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let encoded = match decode_request(&line) {
                    Ok(request) => {
                        debug!(tool = %request.tool, "request received");
                        match tools.dispatch(&request.tool, request.args).await {
                            Ok(output) => encode_success(&request.id, &output),
                            Err(body) => encode_failure(&request.id, &body),
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "malformed request line");
                        let body = ErrorBody::new("invalid_input", e.to_string());
                        encode_failure(&Value::Null, &body)
                    }
                };
                match encoded {
                    Ok(response) => {
                        if tx.send(response).await.is_err() {
                            error!("response channel closed");
                        }
                    }
                    Err(e) => error!(error = %e, "failed to encode response"),
                }
            });
        }

        info!("stdin closed, shutting down transport");
        drop(tx);
        writer.await.map_err(|_| CommError::ChannelClosed)?;
        Ok(())
    }
}

async fn send(tx: &mpsc::Sender<String>, encoded: Result<String>) -> Result<()> {
    let line = encoded?;
    tx.send(line).await.map_err(|_| CommError::ChannelClosed)
}
