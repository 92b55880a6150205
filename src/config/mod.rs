//! Configuration module for the Reserva Gateway server
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! The model provider API key is the only hard requirement: configuration loading fails
//! fast at startup when `OPENAI_API_KEY` is absent, since every speech turn depends on it.
//!
//! # Example
//! ```rust,no_run
//! use reserva_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable base
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

mod yaml;

pub use yaml::YamlConfig;

/// Default bind host.
const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
const DEFAULT_PORT: u16 = 3000;

/// Default OpenAI API base URL.
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat-completion model for field extraction.
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Default bounded timeout for model calls, in seconds.
const DEFAULT_OPENAI_TIMEOUT_SECS: u64 = 10;

/// Default TTS voice for Say verbs.
const DEFAULT_VOICE_NAME: &str = "Polly.Amy";

/// Default speech-recognition language for Gather verbs.
const DEFAULT_SPEECH_LANGUAGE: &str = "en-GB";

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The model provider API key is missing; the server refuses to start without it
    #[error("OPENAI_API_KEY not set (required for field extraction)")]
    MissingApiKey,

    /// An environment variable or YAML value failed to parse
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid YAML
    #[error("Failed to parse configuration file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Field-extraction strategy selection
///
/// The six original handler variants collapse into one binary with the
/// strategy chosen here: `Stateless` performs one extraction-only model call
/// per turn and lets the dialogue controller pick every question, while
/// `Conversational` carries the full dialogue history and lets the model
/// drive the conversation until it emits a completion marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractorMode {
    /// One stateless field-extraction model call per turn
    #[default]
    Stateless,
    /// Multi-turn dialogue carrying full message history
    Conversational,
}

impl FromStr for ExtractorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stateless" => Ok(ExtractorMode::Stateless),
            "conversational" => Ok(ExtractorMode::Conversational),
            other => Err(format!(
                "unknown extractor mode '{other}' (expected 'stateless' or 'conversational')"
            )),
        }
    }
}

impl fmt::Display for ExtractorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractorMode::Stateless => write!(f, "stateless"),
            ExtractorMode::Conversational => write!(f, "conversational"),
        }
    }
}

/// Server configuration
///
/// Contains all configuration needed to run the Reserva Gateway server:
/// - Server settings (host, port)
/// - Model provider settings (API key, base URL, model, timeout)
/// - Voice flow settings (public callback base URL, extractor strategy, voice, language)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // Model provider settings
    /// OpenAI API key for chat-completion extraction calls (required)
    pub openai_api_key: String,
    /// OpenAI API base URL (overridable for self-hosted gateways and tests)
    pub openai_base_url: String,
    /// Chat-completion model name
    pub openai_model: String,
    /// Bounded timeout for model calls, in seconds; expiry is treated as an
    /// extraction failure, not a crash
    pub openai_timeout_seconds: u64,

    // Voice flow settings
    /// Public base URL used to build the telephony provider's callback target
    /// for follow-up turns (`{public_base_url}/process-speech`)
    pub public_base_url: String,
    /// Field-extraction strategy
    pub extractor_mode: ExtractorMode,
    /// TTS voice for Say verbs
    pub voice_name: String,
    /// Speech-recognition language for Gather verbs
    pub speech_language: String,
}

/// Implement Drop to zeroize the model API key when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        self.openai_api_key.zeroize();
    }
}

impl ServerConfig {
    /// Load configuration from environment variables only
    ///
    /// Reads each setting from its environment variable, falling back to
    /// defaults for everything except `OPENAI_API_KEY`, which is required.
    /// Note: the .env file is loaded in main.rs at application startup, so
    /// .env values appear here as ordinary environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_parts(None)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml_config = YamlConfig::from_file(path)?;
        Self::from_parts(Some(yaml_config))
    }

    /// Merge environment variables (base) with optional YAML overrides,
    /// then validate the final configuration.
    fn from_parts(yaml: Option<YamlConfig>) -> Result<Self, ConfigError> {
        let yaml = yaml.unwrap_or_default();
        let server = yaml.server.unwrap_or_default();
        let openai = yaml.openai.unwrap_or_default();
        let voice = yaml.voice.unwrap_or_default();

        let host = server
            .host
            .or_else(|| env_nonempty("HOST"))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match server.port {
            Some(port) => port,
            None => parse_env("PORT", DEFAULT_PORT)?,
        };

        let openai_api_key = openai
            .api_key
            .or_else(|| env_nonempty("OPENAI_API_KEY"))
            .ok_or(ConfigError::MissingApiKey)?;

        let openai_base_url = openai
            .base_url
            .or_else(|| env_nonempty("OPENAI_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

        let openai_model = openai
            .model
            .or_else(|| env_nonempty("OPENAI_MODEL"))
            .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());

        let openai_timeout_seconds = match openai.timeout_seconds {
            Some(secs) => secs,
            None => parse_env("OPENAI_TIMEOUT_SECONDS", DEFAULT_OPENAI_TIMEOUT_SECS)?,
        };

        let public_base_url = voice
            .public_base_url
            .or_else(|| env_nonempty("PUBLIC_BASE_URL"))
            .unwrap_or_else(|| format!("http://{host}:{port}"));

        let extractor_mode = match voice
            .extractor_mode
            .or_else(|| env_nonempty("EXTRACTOR_MODE"))
        {
            Some(raw) => {
                ExtractorMode::from_str(&raw).map_err(|reason| ConfigError::InvalidValue {
                    key: "EXTRACTOR_MODE",
                    value: raw,
                    reason,
                })?
            }
            None => ExtractorMode::default(),
        };

        let voice_name = voice
            .voice_name
            .or_else(|| env_nonempty("VOICE_NAME"))
            .unwrap_or_else(|| DEFAULT_VOICE_NAME.to_string());

        let speech_language = voice
            .speech_language
            .or_else(|| env_nonempty("SPEECH_LANGUAGE"))
            .unwrap_or_else(|| DEFAULT_SPEECH_LANGUAGE.to_string());

        let config = Self {
            host,
            port,
            openai_api_key,
            openai_base_url,
            openai_model,
            openai_timeout_seconds,
            public_base_url,
            extractor_mode,
            voice_name,
            speech_language,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the merged configuration
    fn validate(&self) -> Result<(), ConfigError> {
        if self.openai_api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.openai_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "OPENAI_TIMEOUT_SECONDS",
                value: "0".to_string(),
                reason: "timeout must be at least one second".to_string(),
            });
        }
        Ok(())
    }

    /// Get the server address as a string in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Callback URL the telephony provider posts speech turns to
    pub fn process_speech_url(&self) -> String {
        format!(
            "{}/process-speech",
            self.public_base_url.trim_end_matches('/')
        )
    }
}

/// Read an environment variable, treating empty or whitespace-only values as unset
fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read and parse an environment variable, falling back to a default when unset
fn parse_env<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env_nonempty(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            value: raw,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    /// Clear every environment variable this module reads
    fn clear_env() {
        for key in [
            "HOST",
            "PORT",
            "OPENAI_API_KEY",
            "OPENAI_BASE_URL",
            "OPENAI_MODEL",
            "OPENAI_TIMEOUT_SECONDS",
            "PUBLIC_BASE_URL",
            "EXTRACTOR_MODE",
            "VOICE_NAME",
            "SPEECH_LANGUAGE",
        ] {
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        unsafe { std::env::set_var("OPENAI_API_KEY", "sk-test") };

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.openai_timeout_seconds, 10);
        assert_eq!(config.public_base_url, "http://0.0.0.0:3000");
        assert_eq!(config.extractor_mode, ExtractorMode::Stateless);
        assert_eq!(config.voice_name, "Polly.Amy");
        assert_eq!(config.speech_language, "en-GB");
    }

    #[test]
    #[serial]
    fn test_from_env_missing_api_key_fails() {
        clear_env();

        let result = ServerConfig::from_env();
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_port() {
        clear_env();
        unsafe {
            std::env::set_var("OPENAI_API_KEY", "sk-test");
            std::env::set_var("PORT", "not-a-port");
        }

        let result = ServerConfig::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key: "PORT", .. })
        ));
    }

    #[test]
    #[serial]
    fn test_from_env_extractor_mode() {
        clear_env();
        unsafe {
            std::env::set_var("OPENAI_API_KEY", "sk-test");
            std::env::set_var("EXTRACTOR_MODE", "Conversational");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.extractor_mode, ExtractorMode::Conversational);
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_unknown_mode() {
        clear_env();
        unsafe {
            std::env::set_var("OPENAI_API_KEY", "sk-test");
            std::env::set_var("EXTRACTOR_MODE", "psychic");
        }

        let result = ServerConfig::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                key: "EXTRACTOR_MODE",
                ..
            })
        ));
    }

    #[test]
    #[serial]
    fn test_from_env_zero_timeout_rejected() {
        clear_env();
        unsafe {
            std::env::set_var("OPENAI_API_KEY", "sk-test");
            std::env::set_var("OPENAI_TIMEOUT_SECONDS", "0");
        }

        let result = ServerConfig::from_env();
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_from_file_yaml_overrides_env() {
        clear_env();
        unsafe {
            std::env::set_var("OPENAI_API_KEY", "sk-from-env");
            std::env::set_var("PORT", "4000");
        }

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "server:\n  port: 8080\nvoice:\n  extractor_mode: conversational\n  public_base_url: \"https://calls.example.com\"\n"
        )
        .unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        // YAML wins over env
        assert_eq!(config.port, 8080);
        assert_eq!(config.extractor_mode, ExtractorMode::Conversational);
        assert_eq!(
            config.process_speech_url(),
            "https://calls.example.com/process-speech"
        );
        // env still provides what YAML leaves out
        assert_eq!(config.openai_api_key, "sk-from-env");
    }

    #[test]
    #[serial]
    fn test_from_file_missing_file() {
        clear_env();
        unsafe { std::env::set_var("OPENAI_API_KEY", "sk-test") };

        let result = ServerConfig::from_file(Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    #[serial]
    fn test_from_file_invalid_yaml() {
        clear_env();
        unsafe { std::env::set_var("OPENAI_API_KEY", "sk-test") };

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "server: [not: valid").unwrap();

        let result = ServerConfig::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn test_process_speech_url_trims_trailing_slash() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            openai_api_key: "sk-test".to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_timeout_seconds: 10,
            public_base_url: "https://example.com/".to_string(),
            extractor_mode: ExtractorMode::Stateless,
            voice_name: DEFAULT_VOICE_NAME.to_string(),
            speech_language: DEFAULT_SPEECH_LANGUAGE.to_string(),
        };
        assert_eq!(
            config.process_speech_url(),
            "https://example.com/process-speech"
        );
    }
}
