//! Stdio transport — reads JSON-RPC from stdin, writes to stdout.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::protocol::ProtocolHandler;
use crate::types::{McpError, McpResult, RequestId};

use super::framing;

type SharedWriter = Arc<Mutex<Box<dyn AsyncWrite + Send + Unpin>>>;

/// Stdio transport for desktop MCP clients.
///
/// Each request line is handled on its own task, so a slow upstream search
/// does not hold up later requests. Responses may therefore arrive out of
/// order; clients match them by id.
pub struct StdioTransport {
    handler: Arc<ProtocolHandler>,
}

impl StdioTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Run the transport loop on the process's stdin and stdout.
    pub async fn run(&self) -> McpResult<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Run the transport loop over arbitrary streams until `input` hits EOF.
    pub async fn serve<R, W>(&self, input: R, output: W) -> McpResult<()>
    where
        R: tokio::io::AsyncRead + Unpin,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let writer: SharedWriter = Arc::new(Mutex::new(Box::new(output)));
        let mut reader = BufReader::new(input);
        let mut line = String::new();
        let mut in_flight = JoinSet::new();

        tracing::info!("Stdio transport started");

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await.map_err(McpError::Io)?;

            if bytes_read == 0 {
                tracing::info!("EOF on stdin, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match framing::parse_message(trimmed) {
                Ok(msg) => {
                    let handler = self.handler.clone();
                    let writer = writer.clone();
                    in_flight.spawn(async move {
                        if let Some(response) = handler.handle_message(msg).await {
                            if let Err(e) = write_line(&writer, &response).await {
                                tracing::error!("Failed to write response: {e}");
                            }
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!("Rejected message: {e}");
                    let id = serde_json::from_str::<serde_json::Value>(trimmed)
                        .map(|v| framing::salvage_id(&v))
                        .unwrap_or(RequestId::Null);
                    let value = framing::error_response(&e, id)?;
                    write_line(&writer, &value).await?;
                }
            }

            // Reap finished tasks so the set does not grow without bound.
            while in_flight.try_join_next().is_some() {}
        }

        while in_flight.join_next().await.is_some() {}

        Ok(())
    }
}

async fn write_line(writer: &SharedWriter, value: &serde_json::Value) -> McpResult<()> {
    let framed = framing::frame_message(value)?;
    let mut out = writer.lock().await;
    out.write_all(framed.as_bytes()).await.map_err(McpError::Io)?;
    out.flush().await.map_err(McpError::Io)?;
    Ok(())
}
