use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a client session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier used in logs (e.g., "session-6f1c...")
    pub session_id: String,

    /// Server origin; the duplex channel lives at `/ws` on the same host
    pub server_url: String,

    /// Fixed wait between reconnection attempts
    /// Default: 3 seconds
    pub retry_delay: Duration,

    /// chrono format string for history timestamps
    pub time_format: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SessionConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            server_url: cfg.server.url.clone(),
            retry_delay: cfg.connection.retry_delay(),
            time_format: cfg.display.time_format.clone(),
        }
    }
}
