use crate::api::{Provider, Snapshot};
use crate::connection::ConnectionEvent;

/// Everything the session loop reacts to, delivered over one ordered queue
#[derive(Debug)]
pub enum SessionEvent {
    Connection(ConnectionEvent),
    User(UserAction),
    Completed(Completion),
    Shutdown,
}

/// Explicit user actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Clear the chat thread (Escape in the browser client)
    ResetChat,
    ToggleListening,
    SelectDevice(i64),
    /// Send client-side text to the server as a transcription frame
    SendTranscription(String),
    UpdateKey { provider: Provider, key: String },
}

/// Results of one-shot calls, arriving whenever they finish
#[derive(Debug)]
pub enum Completion {
    /// Initialization snapshot for the channel opened at `epoch`
    Snapshot {
        epoch: u64,
        listening_ticket: u64,
        devices_ticket: u64,
        snapshot: Snapshot,
    },
    Listening { ticket: u64, listening: bool },
    DeviceSelected { ticket: u64, index: i64 },
    KeyUpdated { provider: Provider, status: String },
}

/// Issue order of one-shot calls that write the same piece of state
///
/// Each call takes a ticket when it is issued. A result is applied only if
/// no call issued after it has been applied already.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sequence {
    issued: u64,
    applied: u64,
}

impl Sequence {
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Apply `ticket` if it is newer than everything applied so far
    pub fn accept(&mut self, ticket: u64) -> bool {
        if ticket > self.applied {
            self.applied = ticket;
            true
        } else {
            false
        }
    }

    /// Record `ticket` as applied without gating on it
    pub fn supersede(&mut self, ticket: u64) {
        self.applied = self.applied.max(ticket);
    }
}

impl From<ConnectionEvent> for SessionEvent {
    fn from(event: ConnectionEvent) -> Self {
        SessionEvent::Connection(event)
    }
}

impl From<UserAction> for SessionEvent {
    fn from(action: UserAction) -> Self {
        SessionEvent::User(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_rejects_results_older_than_applied() {
        let mut seq = Sequence::default();
        let first = seq.issue();
        let second = seq.issue();

        // Second call finishes first
        assert!(seq.accept(second));
        assert!(!seq.accept(first));
    }

    #[test]
    fn test_sequence_accepts_in_issue_order() {
        let mut seq = Sequence::default();
        let first = seq.issue();
        assert!(seq.accept(first));
        let second = seq.issue();
        assert!(seq.accept(second));
        assert!(!seq.accept(second));
    }

    #[test]
    fn test_sequence_supersede_blocks_older_tickets() {
        let mut seq = Sequence::default();
        let select = seq.issue();
        let snapshot = seq.issue();

        seq.supersede(snapshot);
        assert!(!seq.accept(select));

        // Superseding with an older ticket never moves backwards
        let later = seq.issue();
        assert!(seq.accept(later));
        seq.supersede(snapshot);
        assert!(!seq.accept(later));
    }
}
