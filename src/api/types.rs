use serde::{Deserialize, Serialize};

// ============================================================================
// Response Types
// ============================================================================

/// GET /status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub is_listening: bool,
}

/// One entry of GET /devices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub index: i64,
    pub name: String,
}

/// POST /toggle-listening
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleResponse {
    /// "listening" when capture is now running, anything else otherwise
    pub status: String,
}

impl ToggleResponse {
    pub fn is_listening(&self) -> bool {
        self.status == "listening"
    }
}

/// POST /update-key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateKeyResponse {
    pub status: String,
    #[serde(default)]
    pub provider: Option<String>,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectDeviceRequest {
    pub index: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateKeyRequest {
    pub key: String,
    pub provider: String,
}

/// Answer providers the server can switch between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Gemini,
    Ollama,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
            Provider::Ollama => "ollama",
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "gemini" => Ok(Provider::Gemini),
            "ollama" => Ok(Provider::Ollama),
            other => anyhow::bail!("Unknown provider `{}` (openai, gemini, ollama)", other),
        }
    }
}
