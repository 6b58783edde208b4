use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// An open duplex channel
///
/// `inbound` yields text frames in arrival order and returns `None` once the
/// channel has closed. Frames pushed into `outbound` are written to the peer.
#[derive(Debug)]
pub struct Channel {
    pub inbound: mpsc::Receiver<String>,
    pub outbound: mpsc::Sender<String>,
}

/// Duplex transport trait
///
/// Implementations:
/// - WebSocket: tokio-tungstenite client (`WsTransport`)
/// - In-memory: scripted channels for tests
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Dial the endpoint and complete the handshake
    async fn open(&self, url: &str) -> Result<Channel>;

    /// Get transport name for logging
    fn name(&self) -> &str;
}

/// WebSocket transport
pub struct WsTransport {
    /// Capacity of the inbound and outbound frame queues
    buffer: usize,
}

impl WsTransport {
    pub fn new() -> Self {
        Self { buffer: 100 }
    }
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Transport for WsTransport {
    async fn open(&self, url: &str) -> Result<Channel> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(url)
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;

        let (mut ws_write, mut ws_read) = ws_stream.split();
        let (inbound_tx, inbound_rx) = mpsc::channel::<String>(self.buffer);
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(self.buffer);

        let send_task = tokio::spawn(async move {
            while let Some(frame) = outbound_rx.recv().await {
                if let Err(e) = ws_write.send(Message::Text(frame.into())).await {
                    warn!("WebSocket send failed: {}", e);
                    break;
                }
            }
            let _ = ws_write.close().await;
        });

        tokio::spawn(async move {
            while let Some(result) = ws_read.next().await {
                match result {
                    Ok(Message::Text(text)) => {
                        if inbound_tx.send(text.to_string()).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Binary(bytes)) => {
                        debug!("Ignoring binary frame ({} bytes)", bytes.len());
                    }
                    Ok(Message::Close(frame)) => {
                        info!("Server sent close frame: {:?}", frame);
                        break;
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        warn!("WebSocket error: {}", e);
                        break;
                    }
                }
            }
            // Dropping inbound_tx closes the channel for the manager
            send_task.abort();
        });

        Ok(Channel {
            inbound: inbound_rx,
            outbound: outbound_tx,
        })
    }

    fn name(&self) -> &str {
        "websocket"
    }
}
