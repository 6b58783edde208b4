use anyhow::{bail, Context, Result};
use reqwest::Url;

/// Path of the duplex channel on the server
pub const CHANNEL_PATH: &str = "/ws";

/// Server origin shared by the duplex channel and the one-shot endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    base: Url,
}

impl Origin {
    pub fn parse(url: &str) -> Result<Self> {
        let base = Url::parse(url).with_context(|| format!("Invalid server URL: {}", url))?;

        match base.scheme() {
            "http" | "https" => {}
            other => bail!("Unsupported server scheme `{}` (expected http or https)", other),
        }

        if base.host_str().is_none() {
            bail!("Server URL has no host: {}", url);
        }

        Ok(Self { base })
    }

    pub fn is_secure(&self) -> bool {
        self.base.scheme() == "https"
    }

    /// Duplex channel endpoint: same host and port, `wss` iff the origin is secure
    pub fn channel_url(&self) -> String {
        let scheme = if self.is_secure() { "wss" } else { "ws" };
        format!("{}://{}{}", scheme, self.authority(), CHANNEL_PATH)
    }

    /// Absolute URL for a one-shot endpoint path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}://{}{}", self.base.scheme(), self.authority(), path)
    }

    fn authority(&self) -> String {
        let host = self.base.host_str().unwrap_or_default();
        match self.base.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_origin_uses_ws() {
        let origin = Origin::parse("http://127.0.0.1:8000").unwrap();
        assert!(!origin.is_secure());
        assert_eq!(origin.channel_url(), "ws://127.0.0.1:8000/ws");
        assert_eq!(origin.endpoint("/status"), "http://127.0.0.1:8000/status");
    }

    #[test]
    fn test_secure_origin_uses_wss() {
        let origin = Origin::parse("https://copilot.example.com/").unwrap();
        assert!(origin.is_secure());
        assert_eq!(origin.channel_url(), "wss://copilot.example.com/ws");
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(Origin::parse("ftp://example.com").is_err());
        assert!(Origin::parse("not a url").is_err());
    }
}
