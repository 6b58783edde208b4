//! Client session management
//!
//! This module provides the `ClientSession` abstraction that manages:
//! - The connection manager task (dial, forward frames, reconnect)
//! - The event loop that owns the visible state
//! - One-shot collaborator calls and their completions
//! - Session statistics

mod config;
mod events;
mod session;
mod stats;

pub use config::SessionConfig;
pub use events::{Completion, Sequence, SessionEvent, UserAction};
pub use session::{ClientSession, SessionHandle};
pub use stats::SessionStats;
