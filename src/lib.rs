pub mod api;
pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod protocol;
pub mod session;
pub mod ui;

pub use api::{ApiClient, Device, Provider};
pub use config::Config;
pub use connection::{ConnectionEvent, ConnectionManager, ConnectionState, Origin, Transport};
pub use dispatcher::Dispatcher;
pub use protocol::{AnswerContent, InboundMessage, OutboundMessage, StructuredAnswer};
pub use session::{ClientSession, SessionConfig, SessionHandle, SessionStats, UserAction};
pub use ui::{ConsoleView, Synchronizer, UiEvent, View, VisibleState};
