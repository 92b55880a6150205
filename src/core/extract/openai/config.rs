//! OpenAI extractor configuration.

use std::time::Duration;

use crate::config::ServerConfig;

/// Default OpenAI API base URL.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Default chat-completion model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Configuration shared by both extraction strategies.
#[derive(Debug, Clone)]
pub struct OpenAIExtractorConfig {
    /// API key sent as a bearer token
    pub api_key: String,
    /// API base URL; the chat-completions path is appended
    pub base_url: String,
    /// Chat-completion model name
    pub model: String,
    /// Bounded request timeout; expiry is an extraction failure, handled by
    /// the caller as a spoken re-prompt
    pub timeout: Duration,
}

impl Default for OpenAIExtractorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: OPENAI_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl OpenAIExtractorConfig {
    /// Derive extractor settings from the server configuration.
    pub fn from_server_config(config: &ServerConfig) -> Self {
        Self {
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.clone(),
            model: config.openai_model.clone(),
            timeout: Duration::from_secs(config.openai_timeout_seconds),
        }
    }

    /// Full chat-completions endpoint URL.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
