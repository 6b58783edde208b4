use super::state::{Connection, ConnectionState, Reachability, Transition};
use super::transport::Transport;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Signals produced by the connection manager, in the order they happen
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
    /// A connection attempt started (1-based count over the session)
    Connecting { attempt: u64 },
    /// The channel is open; `epoch` identifies it until the next open
    Reachable {
        epoch: u64,
        outbound: mpsc::Sender<String>,
    },
    /// One inbound text frame
    Frame(String),
    /// The channel closed or the attempt failed; a retry is scheduled
    Unreachable,
}

/// Owns the duplex channel lifecycle and reconnects indefinitely
pub struct ConnectionManager {
    transport: Arc<dyn Transport>,
    url: String,
    connection: Connection,
}

impl ConnectionManager {
    pub fn new(transport: Arc<dyn Transport>, url: String, retry_delay: Duration) -> Self {
        Self {
            transport,
            url,
            connection: Connection::new(retry_delay),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Run until the event receiver is dropped
    ///
    /// Every close is handled the same way: emit `Unreachable`, wait the
    /// fixed retry delay, dial again. There is no attempt limit.
    pub async fn run<E>(mut self, events: mpsc::Sender<E>) -> Connection
    where
        E: From<ConnectionEvent> + Send,
    {
        info!(
            "Connection manager started ({} transport, {})",
            self.transport.name(),
            self.url
        );

        while !events.is_closed() {
            self.connection.apply(Transition::Dial);
            let attempt = self.connection.attempts();
            info!("Connecting to {} (attempt {})", self.url, attempt);

            if events
                .send(ConnectionEvent::Connecting { attempt }.into())
                .await
                .is_err()
            {
                break;
            }

            match self.transport.open(&self.url).await {
                Ok(mut channel) => {
                    if self.connection.apply(Transition::Opened) == Some(Reachability::Reachable) {
                        info!("Channel open (epoch {})", self.connection.epoch());
                        let reachable = ConnectionEvent::Reachable {
                            epoch: self.connection.epoch(),
                            outbound: channel.outbound.clone(),
                        };
                        if events.send(reachable.into()).await.is_err() {
                            break;
                        }
                    }

                    // Frames are forwarded one at a time, preserving arrival order
                    while let Some(frame) = channel.inbound.recv().await {
                        if events.send(ConnectionEvent::Frame(frame).into()).await.is_err() {
                            break;
                        }
                    }

                    info!("Channel closed (epoch {})", self.connection.epoch());
                }
                Err(e) => {
                    warn!("Connection attempt {} failed: {:#}", attempt, e);
                }
            }

            if self.connection.apply(Transition::Dropped) == Some(Reachability::Unreachable)
                && events.send(ConnectionEvent::Unreachable.into()).await.is_err()
            {
                break;
            }

            info!(
                "Reconnecting in {} ms",
                self.connection.retry_delay().as_millis()
            );
            tokio::time::sleep(self.connection.retry_delay()).await;
        }

        if self.connection.state() != ConnectionState::Closed {
            self.connection.apply(Transition::Dropped);
        }

        info!("Connection manager stopped");
        self.connection
    }
}
