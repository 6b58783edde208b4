//! Duplex channel lifecycle
//!
//! - `endpoint` - derive the `/ws` URL from the server origin
//! - `state` - connection state machine and transition table
//! - `transport` - transport seam and the WebSocket implementation
//! - `manager` - connect, forward frames, reconnect after a fixed delay

pub mod endpoint;
pub mod manager;
pub mod state;
pub mod transport;

pub use endpoint::{Origin, CHANNEL_PATH};
pub use manager::{ConnectionEvent, ConnectionManager};
pub use state::{Connection, ConnectionState, Reachability, Transition};
pub use transport::{Channel, Transport, WsTransport};
