use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dostu_client::EndpointConfig;
use dostu_types::{ChatConfig, ContextPolicy};

/// Environment variable holding the endpoint bearer token
pub const API_TOKEN_VAR: &str = "DOSTU_API_TOKEN";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub endpoint: EndpointSection,
    #[serde(default)]
    pub chat: ChatSection,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub api_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointSection {
    pub base_url: String,
    #[serde(default)]
    pub path: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatSection {
    /// Messages sent as context; 0 sends the whole conversation
    pub context_messages: usize,
    pub history_limit: usize,
    pub evict_orphans: bool,
    pub welcome_message: Option<String>,
    pub error_message: Option<String>,
    pub default_title: Option<String>,
}

impl Default for ChatSection {
    fn default() -> Self {
        let defaults = ChatConfig::default();
        Self {
            context_messages: match defaults.context_policy {
                ContextPolicy::LastK { k } => k,
                ContextPolicy::AllMessages => 0,
            },
            history_limit: defaults.history_limit,
            evict_orphans: defaults.evict_orphans,
            welcome_message: None,
            error_message: None,
            default_title: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (`DOSTU_ENDPOINT__BASE_URL`, `DOSTU_LOGGING__LEVEL`, ...)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("DOSTU")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Load secrets from ENV (not in TOML)
        cfg.api_token = std::env::var(API_TOKEN_VAR).map_err(|_| {
            ConfigError::Message(format!("{} environment variable is required", API_TOKEN_VAR))
        })?;

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }

    pub fn endpoint(&self) -> EndpointConfig {
        let endpoint = EndpointConfig::new(&self.endpoint.base_url, &self.api_token)
            .with_timeout(Duration::from_secs(self.endpoint.timeout_secs));
        match &self.endpoint.path {
            Some(path) => endpoint.with_path(path),
            None => endpoint,
        }
    }

    pub fn chat(&self) -> ChatConfig {
        let policy = match self.chat.context_messages {
            0 => ContextPolicy::AllMessages,
            k => ContextPolicy::LastK { k },
        };

        let mut chat = ChatConfig::new()
            .with_context_policy(policy)
            .with_timeout(Duration::from_secs(self.endpoint.timeout_secs))
            .with_history_limit(self.chat.history_limit)
            .with_orphan_eviction(self.chat.evict_orphans);

        if let Some(text) = &self.chat.welcome_message {
            chat = chat.with_welcome_message(text);
        }
        if let Some(text) = &self.chat.error_message {
            chat = chat.with_error_message(text);
        }
        if let Some(title) = &self.chat.default_title {
            chat = chat.with_default_title(title);
        }
        chat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [storage]
        data_dir = "./data"

        [endpoint]
        base_url = "https://assistant.example.com"
        timeout_secs = 30

        [logging]
        level = "info"
        format = "pretty"
    "#;

    #[test]
    fn test_config_structure() {
        let config: Config = toml::from_str(MINIMAL).unwrap();

        assert_eq!(config.storage.data_dir, PathBuf::from("./data"));
        assert_eq!(config.endpoint.timeout_secs, 30);
        assert!(config.api_token.is_empty());

        // Missing [chat] section falls back to the library defaults
        assert_eq!(config.chat.context_messages, 6);
        assert_eq!(config.chat.history_limit, 50);
        assert!(config.chat.evict_orphans);
    }

    #[test]
    fn test_derived_library_configs() {
        let toml = format!(
            "{}\n{}",
            MINIMAL,
            r#"
            [chat]
            context_messages = 0
            history_limit = 20
            evict_orphans = false
            default_title = "New chat"
            "#
        );
        let mut config: Config = toml::from_str(&toml).unwrap();
        config.api_token = "secret".to_string();

        let endpoint = config.endpoint();
        assert_eq!(endpoint.url(), "https://assistant.example.com/yoldostu/chat");
        assert_eq!(endpoint.api_token, "secret");
        assert_eq!(endpoint.timeout(), Duration::from_secs(30));

        let chat = config.chat();
        assert_eq!(chat.context_policy, ContextPolicy::AllMessages);
        assert_eq!(chat.history_limit, 20);
        assert!(!chat.evict_orphans);
        assert_eq!(chat.default_title, "New chat");
        assert_eq!(chat.request_timeout, Duration::from_secs(30));
        assert_eq!(chat.welcome_message, dostu_types::DEFAULT_WELCOME_MESSAGE);
    }

    #[test]
    fn test_endpoint_path_override() {
        let toml = MINIMAL.replace(
            "timeout_secs = 30",
            "timeout_secs = 30\npath = \"/v2/chat\"",
        );
        let config: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.endpoint().url(), "https://assistant.example.com/v2/chat");
    }
}
