use serde::Deserialize;
use std::path::Path;

use super::ConfigError;

/// Complete YAML configuration structure
///
/// This structure represents the full configuration that can be loaded from a YAML file.
/// All fields are optional to allow partial configuration; anything left out falls back
/// to environment variables and defaults.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 3000
///
/// openai:
///   api_key: "sk-your-key"
///   base_url: "https://api.openai.com/v1"
///   model: "gpt-4o-mini"
///   timeout_seconds: 10
///
/// voice:
///   public_base_url: "https://reservations.example.com"
///   extractor_mode: "conversational"
///   voice_name: "Polly.Amy"
///   speech_language: "en-GB"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub openai: Option<OpenAiYaml>,
    pub voice: Option<VoiceYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Model provider configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OpenAiYaml {
    /// OpenAI API key used for chat-completion extraction calls
    pub api_key: Option<String>,
    /// API base URL (overridable for self-hosted gateways and tests)
    pub base_url: Option<String>,
    /// Chat-completion model name
    pub model: Option<String>,
    /// Bounded request timeout for model calls
    pub timeout_seconds: Option<u64>,
}

/// Voice flow configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct VoiceYaml {
    /// Public base URL used to build the telephony provider's callback target
    pub public_base_url: Option<String>,
    /// Extraction strategy: "stateless" or "conversational"
    pub extractor_mode: Option<String>,
    /// TTS voice for Say verbs (e.g. "Polly.Amy")
    pub voice_name: Option<String>,
    /// Speech-recognition language for Gather verbs (e.g. "en-GB")
    pub speech_language: Option<String>,
}

impl YamlConfig {
    /// Load a YAML configuration file from disk
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Yaml {
            path: path.display().to_string(),
            source: e,
        })
    }
}
