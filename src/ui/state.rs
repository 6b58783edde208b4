use crate::api::Device;
use crate::protocol::{StructuredAnswer, FOLLOW_UP_PLACEHOLDER};
use serde::Serialize;
use std::collections::VecDeque;

/// Who a bubble is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    UserTurn,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::UserTurn => "user-turn",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BubbleStyle {
    Primary,
    /// Secondary STAR / deep-dive bubble following a primary answer
    Expansion,
}

/// One rendered turn in the chat thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bubble {
    pub text: String,
    pub role: Role,
    pub style: BubbleStyle,
}

impl Bubble {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: Role::UserTurn,
            style: BubbleStyle::Primary,
        }
    }

    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: Role::Assistant,
            style: BubbleStyle::Primary,
        }
    }

    pub fn expansion(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: Role::Assistant,
            style: BubbleStyle::Expansion,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match (self.role, self.style) {
            (Role::UserTurn, _) => "user-q",
            (Role::Assistant, BubbleStyle::Primary) => "ai",
            (Role::Assistant, BubbleStyle::Expansion) => "ai star",
        }
    }
}

/// Answer-pending indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AnswerIndicator {
    #[default]
    Idle,
    Pending,
}

/// Append-only chat thread with a typing marker at the tail
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatThread {
    bubbles: Vec<Bubble>,
    indicator: AnswerIndicator,
}

impl ChatThread {
    pub fn push(&mut self, bubble: Bubble) {
        self.bubbles.push(bubble);
    }

    /// Remove every bubble; the indicator is left as is
    pub fn clear(&mut self) {
        self.bubbles.clear();
    }

    pub fn set_indicator(&mut self, indicator: AnswerIndicator) {
        self.indicator = indicator;
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn indicator(&self) -> AnswerIndicator {
        self.indicator
    }

    pub fn is_typing(&self) -> bool {
        self.indicator == AnswerIndicator::Pending
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Local time the question arrived, already formatted
    pub time: String,
    pub question: String,
    /// "Candidate" or "Interviewer" when the server says so
    pub source: Option<String>,
}

/// Past questions, newest first
#[derive(Debug, Clone, Default, Serialize)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryLog {
    pub fn prepend(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Latest-wins derived panels
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProPanel {
    pub keywords: Vec<String>,
    pub talking_points: Vec<String>,
    pub follow_up: String,
}

impl Default for ProPanel {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            talking_points: Vec::new(),
            follow_up: FOLLOW_UP_PLACEHOLDER.to_string(),
        }
    }
}

impl ProPanel {
    /// Rebuild every section from a structured answer; nothing carries over
    pub fn from_answer(answer: &StructuredAnswer) -> Self {
        let mut keywords: Vec<String> = Vec::with_capacity(answer.keywords.len());
        for keyword in &answer.keywords {
            if !keywords.contains(keyword) {
                keywords.push(keyword.clone());
            }
        }

        Self {
            keywords,
            talking_points: answer.talking_points.clone(),
            follow_up: answer.follow_up().to_string(),
        }
    }
}

/// Everything the display shows; written only by the synchronizer
#[derive(Debug, Clone, Default, Serialize)]
pub struct VisibleState {
    pub online: bool,
    /// Latest question, quoted
    pub transcription: Option<String>,
    pub chat: ChatThread,
    pub history: HistoryLog,
    pub pro_panel: ProPanel,
    pub listening: bool,
    pub devices: Vec<Device>,
    pub selected_device: Option<i64>,
}

impl VisibleState {
    pub fn status_label(&self) -> &'static str {
        if self.online {
            "ONLINE"
        } else {
            "OFFLINE"
        }
    }

    pub fn toggle_label(&self) -> &'static str {
        if self.listening {
            "DEACTIVATE COPILOT"
        } else {
            "ACTIVATE COPILOT"
        }
    }
}
