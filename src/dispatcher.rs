use crate::protocol::{decode, Decoded, InboundMessage};
use crate::ui::UiEvent;
use serde::Serialize;
use tracing::{debug, warn};

/// Longest frame excerpt included in diagnostics
const PREVIEW_CHARS: usize = 120;

/// Counters for frames seen by the dispatcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub frames_received: u64,
    pub frames_undecodable: u64,
    pub frames_unknown: u64,
    pub statuses_ignored: u64,
}

/// Decodes raw frames and routes them to synchronizer events
///
/// One frame in, at most one event out. A bad frame only affects itself.
#[derive(Debug, Default)]
pub struct Dispatcher {
    stats: DispatchStats,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, raw: &str) -> Option<UiEvent> {
        self.stats.frames_received += 1;

        match decode(raw) {
            Ok(Decoded::Message(message)) => self.route(message),
            Ok(Decoded::Unknown(tag)) => {
                self.stats.frames_unknown += 1;
                debug!("Dropping frame with unknown type `{}`", tag);
                None
            }
            Err(e) => {
                self.stats.frames_undecodable += 1;
                warn!("Dropping undecodable frame: {} ({})", e, preview(raw));
                None
            }
        }
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    fn route(&mut self, message: InboundMessage) -> Option<UiEvent> {
        match message {
            InboundMessage::Question { text, source } => Some(UiEvent::UserTurn { text, source }),
            InboundMessage::Answer { content } => Some(UiEvent::Answer(content)),
            InboundMessage::Status { text } if is_thinking(&text) => Some(UiEvent::AnswerPending),
            InboundMessage::Status { text } => {
                self.stats.statuses_ignored += 1;
                debug!("Ignoring status: {}", text);
                None
            }
        }
    }
}

/// "Thinking..." and "Thinking (Interviewer)..." both mean an answer is on its way
pub fn is_thinking(status: &str) -> bool {
    status
        .trim_start()
        .get(..8)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("thinking"))
}

fn preview(raw: &str) -> String {
    let mut excerpt: String = raw.chars().take(PREVIEW_CHARS).collect();
    if raw.chars().count() > PREVIEW_CHARS {
        excerpt.push('…');
    }
    excerpt
}
