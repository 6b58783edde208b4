//! One-shot HTTP calls to the copilot server
//!
//! - GET /status - whether audio capture is running
//! - GET /devices - available input devices
//! - POST /select-device - choose an input device
//! - POST /toggle-listening - start or stop capture
//! - POST /update-key - switch answer provider / API key

mod client;
mod types;

pub use client::{ApiClient, Snapshot};
pub use types::{
    Device, Provider, SelectDeviceRequest, StatusResponse, ToggleResponse, UpdateKeyRequest,
    UpdateKeyResponse,
};
