use serde::{Deserialize, Serialize};

/// Follow-up text shown when a structured answer carries no interviewer question
pub const FOLLOW_UP_PLACEHOLDER: &str = "Ready for next round.";

/// A decoded inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Speech detected by the server, either side of the conversation
    Question { text: String, source: Option<String> },
    /// AI-generated answer to the latest question
    Answer { content: AnswerContent },
    /// Server status line ("Thinking (Candidate)...", "Listening...")
    Status { text: String },
}

/// Answer payload as delivered by the server
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerContent {
    Plain(String),
    Structured(StructuredAnswer),
}

/// Structured answer object produced by the assistant model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAnswer {
    pub main_answer: String,

    /// STAR details or technical deep-dive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star_expansion: Option<String>,

    pub keywords: Vec<String>,

    pub talking_points: Vec<String>,

    /// Anticipated next question from the interviewer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interviewer_question: Option<String>,
}

impl StructuredAnswer {
    /// Expansion text, if present and non-empty
    pub fn expansion(&self) -> Option<&str> {
        self.star_expansion.as_deref().filter(|s| !s.is_empty())
    }

    /// Follow-up text, falling back to the placeholder
    pub fn follow_up(&self) -> &str {
        self.interviewer_question
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(FOLLOW_UP_PLACEHOLDER)
    }
}

/// Frame the client sends over the duplex channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Text transcribed or typed on the client side
    Transcription(String),
}

impl OutboundMessage {
    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
