//! Wire protocol spoken over the duplex channel
//!
//! Inbound frames are JSON objects tagged by `type`:
//! - `question` - speech detected by the server
//! - `answer` - plain text or a structured answer object
//! - `status` - server status line
//!
//! Outbound frames carry client-side transcriptions.

mod decode;
pub mod messages;

pub use decode::{answer_content, decode, DecodeError, Decoded};
pub use messages::{
    AnswerContent, InboundMessage, OutboundMessage, StructuredAnswer, FOLLOW_UP_PLACEHOLDER,
};
