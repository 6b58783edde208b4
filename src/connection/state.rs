use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Lifecycle state of the duplex channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// Inputs driving the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A connection attempt starts
    Dial,
    /// The channel finished its handshake
    Opened,
    /// The channel closed or the dial failed, for any reason
    Dropped,
}

/// Reachability signal emitted on state changes that matter to the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    Unreachable,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

impl ConnectionState {
    /// Transition table. Unlisted pairs leave the state unchanged.
    pub fn next(self, input: Transition) -> (ConnectionState, Option<Reachability>) {
        match (self, input) {
            (ConnectionState::Closed, Transition::Dial) => (ConnectionState::Connecting, None),
            (ConnectionState::Connecting, Transition::Opened) => {
                (ConnectionState::Open, Some(Reachability::Reachable))
            }
            (ConnectionState::Connecting, Transition::Dropped)
            | (ConnectionState::Open, Transition::Dropped) => {
                (ConnectionState::Closed, Some(Reachability::Unreachable))
            }
            (state, input) => {
                warn!("Ignoring {:?} while {}", input, state);
                (state, None)
            }
        }
    }
}

/// Process-wide connection record for one client session
#[derive(Debug, Clone)]
pub struct Connection {
    state: ConnectionState,
    retry_delay: Duration,
    attempts: u64,
    epoch: u64,
}

impl Connection {
    pub fn new(retry_delay: Duration) -> Self {
        Self {
            state: ConnectionState::Closed,
            retry_delay,
            attempts: 0,
            epoch: 0,
        }
    }

    pub fn apply(&mut self, input: Transition) -> Option<Reachability> {
        let (next, signal) = self.state.next(input);
        if next != self.state {
            match next {
                ConnectionState::Connecting => self.attempts += 1,
                ConnectionState::Open => self.epoch += 1,
                ConnectionState::Closed => {}
            }
        }
        self.state = next;
        signal
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Number of connection attempts started
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Number of successful opens; identifies the current open channel
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_open() {
        let mut conn = Connection::new(Duration::from_millis(3000));
        assert_eq!(conn.state(), ConnectionState::Closed);

        assert_eq!(conn.apply(Transition::Dial), None);
        assert_eq!(conn.state(), ConnectionState::Connecting);

        assert_eq!(conn.apply(Transition::Opened), Some(Reachability::Reachable));
        assert_eq!(conn.state(), ConnectionState::Open);
        assert_eq!(conn.attempts(), 1);
        assert_eq!(conn.epoch(), 1);
    }

    #[test]
    fn test_failed_dial_is_unreachable() {
        let mut conn = Connection::new(Duration::from_millis(3000));
        conn.apply(Transition::Dial);
        assert_eq!(conn.apply(Transition::Dropped), Some(Reachability::Unreachable));
        assert_eq!(conn.state(), ConnectionState::Closed);
        assert_eq!(conn.epoch(), 0);
    }

    #[test]
    fn test_invalid_transitions_are_ignored() {
        let mut conn = Connection::new(Duration::from_millis(3000));
        assert_eq!(conn.apply(Transition::Opened), None);
        assert_eq!(conn.apply(Transition::Dropped), None);
        assert_eq!(conn.state(), ConnectionState::Closed);

        conn.apply(Transition::Dial);
        assert_eq!(conn.apply(Transition::Dial), None);
        assert_eq!(conn.attempts(), 1);
    }

    #[test]
    fn test_epoch_advances_per_open() {
        let mut conn = Connection::new(Duration::from_millis(10));
        for _ in 0..3 {
            conn.apply(Transition::Dial);
            conn.apply(Transition::Opened);
            conn.apply(Transition::Dropped);
        }
        assert_eq!(conn.epoch(), 3);
        assert_eq!(conn.attempts(), 3);
    }
}
