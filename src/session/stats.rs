use crate::dispatcher::DispatchStats;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Statistics about a client session
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub session_id: String,

    /// When the session started
    pub started_at: DateTime<Utc>,

    /// Total duration in seconds
    pub duration_secs: f64,

    /// Connection attempts started, successful or not
    pub connection_attempts: u64,

    /// Attempts that reached the open state
    pub connections_opened: u64,

    /// Frame counters from the dispatcher
    pub frames: DispatchStats,

    /// Bubbles currently in the chat thread
    pub bubbles: usize,

    /// Questions in the history log
    pub history_entries: usize,
}
