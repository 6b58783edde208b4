use super::messages::{AnswerContent, InboundMessage, StructuredAnswer};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Outcome of decoding one well-formed frame
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Message(InboundMessage),
    /// Valid JSON envelope with a tag this client does not know
    Unknown(String),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("`{tag}` frame has no content")]
    MissingContent { tag: String },

    #[error("`{tag}` frame content must be a string")]
    NotText { tag: String },
}

/// Envelope shared by every inbound frame
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    content: Option<Value>,
    #[serde(default)]
    source: Option<String>,
}

/// Decode one raw text frame into a tagged message
pub fn decode(raw: &str) -> Result<Decoded, DecodeError> {
    let envelope: Envelope = serde_json::from_str(raw)?;

    let message = match envelope.tag.as_str() {
        "question" => InboundMessage::Question {
            text: text_content(&envelope)?,
            source: envelope.source,
        },
        "answer" => InboundMessage::Answer {
            content: answer_content(envelope.content.unwrap_or(Value::Null)),
        },
        "status" => InboundMessage::Status {
            text: text_content(&envelope)?,
        },
        _ => return Ok(Decoded::Unknown(envelope.tag)),
    };

    Ok(Decoded::Message(message))
}

fn text_content(envelope: &Envelope) -> Result<String, DecodeError> {
    match &envelope.content {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(DecodeError::NotText {
            tag: envelope.tag.clone(),
        }),
        None => Err(DecodeError::MissingContent {
            tag: envelope.tag.clone(),
        }),
    }
}

/// Read an answer payload, degrading to plain text when it is not a complete answer object
pub fn answer_content(content: Value) -> AnswerContent {
    match content {
        Value::String(text) => AnswerContent::Plain(text),
        Value::Object(_) => match StructuredAnswer::deserialize(&content) {
            Ok(answer) => AnswerContent::Structured(answer),
            Err(e) => {
                tracing::debug!("Answer object incomplete, rendering as text: {}", e);
                AnswerContent::Plain(content.to_string())
            }
        },
        other => AnswerContent::Plain(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_question_with_source() {
        let decoded =
            decode(r#"{"type":"question","content":"Why Rust?","source":"Interviewer"}"#).unwrap();
        assert_eq!(
            decoded,
            Decoded::Message(InboundMessage::Question {
                text: "Why Rust?".to_string(),
                source: Some("Interviewer".to_string()),
            })
        );
    }

    #[test]
    fn test_decode_unknown_tag() {
        let decoded = decode(r#"{"type":"heartbeat","content":1}"#).unwrap();
        assert_eq!(decoded, Decoded::Unknown("heartbeat".to_string()));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode("not json"), Err(DecodeError::Json(_))));
        assert!(matches!(decode(r#"{"content":"x"}"#), Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_decode_rejects_non_text_question() {
        let err = decode(r#"{"type":"question","content":{"a":1}}"#).unwrap_err();
        assert!(matches!(err, DecodeError::NotText { .. }));

        let err = decode(r#"{"type":"status"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingContent { .. }));
    }

    #[test]
    fn test_answer_with_optional_fields_missing() {
        let content = answer_content(json!({
            "main_answer": "Short answer.",
            "keywords": [],
            "talking_points": []
        }));

        match content {
            AnswerContent::Structured(answer) => {
                assert_eq!(answer.expansion(), None);
                assert_eq!(answer.follow_up(), "Ready for next round.");
            }
            other => panic!("expected structured answer, got {:?}", other),
        }
    }

    #[test]
    fn test_answer_missing_required_field_degrades_to_text() {
        let content = answer_content(json!({ "main_answer": "No lists here." }));
        match content {
            AnswerContent::Plain(text) => assert!(text.contains("No lists here.")),
            other => panic!("expected plain answer, got {:?}", other),
        }
    }

    #[test]
    fn test_incomplete_answer_text_keeps_key_order() {
        let decoded = decode(
            r#"{"type":"answer","content":{"main_answer":"m","keywords":null,"talking_points":[]}}"#,
        )
        .unwrap();
        assert_eq!(
            decoded,
            Decoded::Message(InboundMessage::Answer {
                content: AnswerContent::Plain(
                    r#"{"main_answer":"m","keywords":null,"talking_points":[]}"#.to_string()
                )
            })
        );
    }

    #[test]
    fn test_answer_empty_strings_count_as_absent() {
        let content = answer_content(json!({
            "main_answer": "Answer.",
            "star_expansion": "",
            "keywords": ["Go"],
            "talking_points": [],
            "interviewer_question": ""
        }));
        let AnswerContent::Structured(answer) = content else {
            panic!("expected structured answer");
        };
        assert_eq!(answer.expansion(), None);
        assert_eq!(answer.follow_up(), "Ready for next round.");
    }

    #[test]
    fn test_answer_scalar_content_is_plain() {
        assert_eq!(answer_content(json!(42)), AnswerContent::Plain("42".to_string()));

        let decoded = decode(r#"{"type":"answer"}"#).unwrap();
        assert_eq!(
            decoded,
            Decoded::Message(InboundMessage::Answer {
                content: AnswerContent::Plain("null".to_string())
            })
        );
    }
}
