use super::state::{AnswerIndicator, Bubble, HistoryEntry, ProPanel, VisibleState};
use crate::api::Device;
use crate::connection::Reachability;
use crate::protocol::AnswerContent;
use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use tracing::{debug, warn};

const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

/// Typed events the synchronizer turns into visible state
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Reachability(Reachability),
    /// A question was heard
    UserTurn { text: String, source: Option<String> },
    /// The server started working on an answer
    AnswerPending,
    Answer(AnswerContent),
    /// User asked to clear the chat thread
    ResetChat,
    Listening(bool),
    Devices(Vec<Device>),
    DeviceSelected(i64),
}

/// Part of the display that needs redrawing after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Reachability,
    Transcription,
    /// Bubble appended at this index
    BubbleAdded(usize),
    ChatCleared,
    Indicator,
    History,
    ProPanel,
    Listening,
    Devices,
}

/// The only writer of `VisibleState`
#[derive(Debug, Clone)]
pub struct Synchronizer {
    time_format: String,
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_FORMAT)
    }
}

impl Synchronizer {
    pub fn new(time_format: &str) -> Self {
        let valid = !time_format.trim().is_empty()
            && !StrftimeItems::new(time_format).any(|item| matches!(item, Item::Error));
        let time_format = if valid {
            time_format
        } else {
            warn!("Invalid time format {:?}, using {}", time_format, DEFAULT_TIME_FORMAT);
            DEFAULT_TIME_FORMAT
        };

        Self {
            time_format: time_format.to_string(),
        }
    }

    pub fn apply(&self, state: &mut VisibleState, event: UiEvent) -> Vec<Change> {
        debug!("Applying {:?}", event);

        match event {
            UiEvent::Reachability(reachability) => {
                state.online = reachability == Reachability::Reachable;
                vec![Change::Reachability]
            }
            UiEvent::UserTurn { text, source } => {
                state.transcription = Some(format!("\"{}\"", text));
                let index = Self::push(state, Bubble::user(text.clone()));
                state.history.prepend(HistoryEntry {
                    time: self.timestamp(),
                    question: text,
                    source,
                });
                vec![Change::Transcription, Change::BubbleAdded(index), Change::History]
            }
            UiEvent::AnswerPending => {
                state.chat.set_indicator(AnswerIndicator::Pending);
                vec![Change::Indicator]
            }
            UiEvent::Answer(content) => {
                state.chat.set_indicator(AnswerIndicator::Idle);
                let mut changes = vec![Change::Indicator];

                match content {
                    AnswerContent::Structured(answer) => {
                        state.pro_panel = ProPanel::from_answer(&answer);
                        changes.push(Change::ProPanel);

                        let expansion = answer.expansion().map(str::to_string);
                        changes.push(Change::BubbleAdded(Self::push(
                            state,
                            Bubble::answer(answer.main_answer),
                        )));
                        if let Some(expansion) = expansion {
                            changes.push(Change::BubbleAdded(Self::push(
                                state,
                                Bubble::expansion(expansion),
                            )));
                        }
                    }
                    AnswerContent::Plain(text) => {
                        changes.push(Change::BubbleAdded(Self::push(state, Bubble::answer(text))));
                    }
                }

                changes
            }
            UiEvent::ResetChat => {
                state.chat.clear();
                vec![Change::ChatCleared]
            }
            UiEvent::Listening(listening) => {
                state.listening = listening;
                vec![Change::Listening]
            }
            UiEvent::Devices(devices) => {
                state.devices = devices;
                vec![Change::Devices]
            }
            UiEvent::DeviceSelected(index) => {
                state.selected_device = Some(index);
                vec![Change::Devices]
            }
        }
    }

    fn push(state: &mut VisibleState, bubble: Bubble) -> usize {
        state.chat.push(bubble);
        state.chat.len() - 1
    }

    fn timestamp(&self) -> String {
        Local::now().format(&self.time_format).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::StructuredAnswer;
    use crate::ui::state::{BubbleStyle, Role};

    fn structured(main: &str, keywords: &[&str]) -> AnswerContent {
        AnswerContent::Structured(StructuredAnswer {
            main_answer: main.to_string(),
            star_expansion: None,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            talking_points: vec![],
            interviewer_question: None,
        })
    }

    #[test]
    fn test_user_turn_appends_bubble_then_history() {
        let sync = Synchronizer::default();
        let mut state = VisibleState::default();

        let changes = sync.apply(
            &mut state,
            UiEvent::UserTurn {
                text: "Tell me about yourself".to_string(),
                source: None,
            },
        );

        assert_eq!(
            changes,
            vec![Change::Transcription, Change::BubbleAdded(0), Change::History]
        );
        assert_eq!(state.transcription.as_deref(), Some("\"Tell me about yourself\""));
        assert_eq!(state.chat.bubbles(), &[Bubble::user("Tell me about yourself")]);
        assert_eq!(state.chat.bubbles()[0].role.as_str(), "user-turn");
        assert_eq!(state.history.len(), 1);
        assert!(!state.history.latest().unwrap().time.is_empty());
    }

    #[test]
    fn test_history_is_newest_first() {
        let sync = Synchronizer::default();
        let mut state = VisibleState::default();

        for text in ["first", "second"] {
            sync.apply(
                &mut state,
                UiEvent::UserTurn {
                    text: text.to_string(),
                    source: Some("Interviewer".to_string()),
                },
            );
        }

        let questions: Vec<&str> = state.history.entries().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, vec!["second", "first"]);
        assert_eq!(state.chat.bubbles()[0].text, "first");
    }

    #[test]
    fn test_pending_then_answer_clears_indicator() {
        let sync = Synchronizer::default();
        let mut state = VisibleState::default();

        sync.apply(&mut state, UiEvent::AnswerPending);
        assert!(state.chat.is_typing());

        sync.apply(&mut state, UiEvent::Answer(AnswerContent::Plain("ok".to_string())));
        assert!(!state.chat.is_typing());
    }

    #[test]
    fn test_structured_answer_with_expansion() {
        let sync = Synchronizer::default();
        let mut state = VisibleState::default();

        let answer = AnswerContent::Structured(StructuredAnswer {
            main_answer: "Main.".to_string(),
            star_expansion: Some("Situation, Task, Action, Result.".to_string()),
            keywords: vec!["Rust".to_string(), "Rust".to_string(), "Tokio".to_string()],
            talking_points: vec!["Ownership".to_string()],
            interviewer_question: Some("Why async?".to_string()),
        });
        sync.apply(&mut state, UiEvent::Answer(answer));

        let bubbles = state.chat.bubbles();
        assert_eq!(bubbles.len(), 2);
        assert_eq!(bubbles[0].css_class(), "ai");
        assert_eq!(bubbles[1].style, BubbleStyle::Expansion);
        assert_eq!(bubbles[1].css_class(), "ai star");
        assert_eq!(state.pro_panel.keywords, vec!["Rust", "Tokio"]);
        assert_eq!(state.pro_panel.follow_up, "Why async?");
    }

    #[test]
    fn test_structured_answer_replaces_panel() {
        let sync = Synchronizer::default();
        let mut state = VisibleState::default();

        sync.apply(&mut state, UiEvent::Answer(structured("One.", &["Old", "Stale"])));
        sync.apply(&mut state, UiEvent::Answer(structured("Two.", &["New"])));

        assert_eq!(state.pro_panel.keywords, vec!["New"]);
        assert!(state.pro_panel.talking_points.is_empty());
        assert_eq!(state.pro_panel.follow_up, "Ready for next round.");
    }

    #[test]
    fn test_plain_answer_leaves_panel() {
        let sync = Synchronizer::default();
        let mut state = VisibleState::default();

        sync.apply(&mut state, UiEvent::Answer(structured("One.", &["Kept"])));
        let panel = state.pro_panel.clone();

        let changes = sync.apply(&mut state, UiEvent::Answer(AnswerContent::Plain("Plain".into())));
        assert!(!changes.contains(&Change::ProPanel));
        assert_eq!(state.pro_panel, panel);
        assert_eq!(state.chat.bubbles().last().unwrap().role, Role::Assistant);
    }

    #[test]
    fn test_reset_keeps_history_panel_and_indicator() {
        let sync = Synchronizer::default();
        let mut state = VisibleState::default();

        sync.apply(
            &mut state,
            UiEvent::UserTurn {
                text: "Q".to_string(),
                source: None,
            },
        );
        sync.apply(&mut state, UiEvent::Answer(structured("A", &["K"])));
        sync.apply(&mut state, UiEvent::AnswerPending);

        sync.apply(&mut state, UiEvent::ResetChat);

        assert!(state.chat.is_empty());
        assert!(state.chat.is_typing());
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.pro_panel.keywords, vec!["K"]);
    }

    #[test]
    fn test_reachability_and_labels() {
        let sync = Synchronizer::default();
        let mut state = VisibleState::default();
        assert_eq!(state.status_label(), "OFFLINE");

        sync.apply(&mut state, UiEvent::Reachability(Reachability::Reachable));
        assert_eq!(state.status_label(), "ONLINE");

        sync.apply(&mut state, UiEvent::Listening(true));
        assert_eq!(state.toggle_label(), "DEACTIVATE COPILOT");

        sync.apply(&mut state, UiEvent::Reachability(Reachability::Unreachable));
        assert_eq!(state.status_label(), "OFFLINE");
    }

    #[test]
    fn test_bad_time_format_falls_back() {
        assert_eq!(Synchronizer::new("  ").time_format, "%H:%M:%S");
        assert_eq!(Synchronizer::new("%Q").time_format, "%H:%M:%S");
        assert_eq!(Synchronizer::new("%H:%M").time_format, "%H:%M");
    }
}
