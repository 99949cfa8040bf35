use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_CHAT_PATH: &str = "/yoldostu/chat";

fn default_path() -> String {
    DEFAULT_CHAT_PATH.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// Where and how to reach the exchange endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub base_url: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// Bearer credential; never written to config files
    #[serde(default, skip_serializing)]
    pub api_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl EndpointConfig {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path: default_path(),
            api_token: api_token.into(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full URL of the exchange operation
    pub fn url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_cleanly() {
        let config = EndpointConfig::new("https://example.test/", "token");
        assert_eq!(config.url(), "https://example.test/yoldostu/chat");

        let config = EndpointConfig::new("https://example.test", "token").with_path("v2/chat");
        assert_eq!(config.url(), "https://example.test/v2/chat");
    }

    #[test]
    fn test_defaults_when_deserialized() {
        let config: EndpointConfig =
            serde_json::from_str(r#"{"base_url": "https://example.test"}"#).unwrap();
        assert_eq!(config.path, DEFAULT_CHAT_PATH);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert!(config.api_token.is_empty());
    }

    #[test]
    fn test_token_is_not_serialized() {
        let json = serde_json::to_string(&EndpointConfig::new("https://example.test", "secret")).unwrap();
        assert!(!json.contains("secret"));
    }
}
