use super::types::{
    Device, Provider, SelectDeviceRequest, StatusResponse, ToggleResponse, UpdateKeyRequest,
    UpdateKeyResponse,
};
use crate::connection::Origin;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

/// Status and device snapshot fetched after each successful connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub status: StatusResponse,
    pub devices: Vec<Device>,
}

/// Client for the server's one-shot request/response endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    origin: Origin,
}

impl ApiClient {
    pub fn new(origin: Origin) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http, origin })
    }

    /// GET /status
    pub async fn status(&self) -> Result<StatusResponse> {
        self.get_json("/status").await
    }

    /// GET /devices
    pub async fn devices(&self) -> Result<Vec<Device>> {
        self.get_json("/devices").await
    }

    /// Status followed by devices; nothing is returned unless both succeed
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let status = self.status().await.context("Failed to fetch status")?;
        let devices = self.devices().await.context("Failed to fetch devices")?;
        Ok(Snapshot { status, devices })
    }

    /// POST /select-device
    pub async fn select_device(&self, index: i64) -> Result<()> {
        info!("Selecting input device {}", index);

        self.http
            .post(self.origin.endpoint("/select-device"))
            .json(&SelectDeviceRequest { index })
            .send()
            .await
            .context("Failed to send device selection")?
            .error_for_status()
            .context("Device selection rejected")?;

        Ok(())
    }

    /// POST /toggle-listening
    pub async fn toggle_listening(&self) -> Result<ToggleResponse> {
        let response = self
            .http
            .post(self.origin.endpoint("/toggle-listening"))
            .send()
            .await
            .context("Failed to toggle listening")?
            .error_for_status()
            .context("Toggle rejected")?;

        response
            .json()
            .await
            .context("Failed to parse toggle response")
    }

    /// POST /update-key
    pub async fn update_key(&self, provider: Provider, key: &str) -> Result<UpdateKeyResponse> {
        info!("Updating API key for {}", provider.as_str());

        let response = self
            .http
            .post(self.origin.endpoint("/update-key"))
            .json(&UpdateKeyRequest {
                key: key.to_string(),
                provider: provider.as_str().to_string(),
            })
            .send()
            .await
            .context("Failed to send key update")?
            .error_for_status()
            .context("Key update rejected")?;

        response
            .json()
            .await
            .context("Failed to parse key update response")
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.origin.endpoint(path);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("GET {} returned an error status", url))?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }
}
