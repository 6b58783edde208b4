//! Visible state and the synchronizer that derives it
//!
//! - `state` - chat thread, history log, pro panel, indicators
//! - `sync` - event → state transitions (the only writer)
//! - `view` - rendering seam and a console implementation

pub mod state;
pub mod sync;
pub mod view;

pub use state::{
    AnswerIndicator, Bubble, BubbleStyle, ChatThread, HistoryEntry, HistoryLog, ProPanel, Role,
    VisibleState,
};
pub use sync::{Change, Synchronizer, UiEvent};
pub use view::{ConsoleView, View};
