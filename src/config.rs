//! Runtime configuration
//!
//! Values come from built-in defaults, then an optional TOML file, then the
//! environment. Only the API key is read from the environment.

use crate::audio::codec::{CAPTURE_SAMPLE_RATE, PLAYBACK_SAMPLE_RATE};
use crate::live::client::DEFAULT_ENDPOINT;
use crate::live::prompts::{DEFAULT_VOICE, GREETING_NUDGE, SYSTEM_INSTRUCTION};
use crate::{Result, SumyError};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variables checked for the API key, in order
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-native-audio-preview-09-2025";

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SumyConfig {
    /// Credential for the live endpoint
    pub api_key: Option<String>,

    /// Live model identifier, with or without the `models/` prefix
    pub model: String,

    /// Prebuilt voice for agent speech
    pub voice_name: String,

    /// Websocket endpoint without query string
    pub endpoint: String,

    /// Rate the microphone stream is resampled to before upload
    pub input_sample_rate: u32,

    /// Rate of the agent's PCM audio
    pub output_sample_rate: u32,

    /// Samples per uploaded frame
    pub capture_chunk_size: usize,

    pub system_instruction: String,

    /// Sent once the session opens so the agent greets first
    pub greeting_nudge: String,

    /// Request user and agent transcripts
    pub enable_transcription: bool,

    /// Upper bound on connect plus setup acknowledgement
    pub setup_timeout_secs: u64,
}

impl Default for SumyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            voice_name: DEFAULT_VOICE.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            input_sample_rate: CAPTURE_SAMPLE_RATE,
            output_sample_rate: PLAYBACK_SAMPLE_RATE,
            capture_chunk_size: 4096,
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            greeting_nudge: GREETING_NUDGE.to_string(),
            enable_transcription: true,
            setup_timeout_secs: 15,
        }
    }
}

impl fmt::Debug for SumyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SumyConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("voice_name", &self.voice_name)
            .field("endpoint", &self.endpoint)
            .field("input_sample_rate", &self.input_sample_rate)
            .field("output_sample_rate", &self.output_sample_rate)
            .field("capture_chunk_size", &self.capture_chunk_size)
            .field("enable_transcription", &self.enable_transcription)
            .field("setup_timeout_secs", &self.setup_timeout_secs)
            .finish_non_exhaustive()
    }
}

impl SumyConfig {
    /// `<config dir>/sumy-command/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sumy-command").join("config.toml"))
    }

    /// Load from `path` (or the default location if it exists), then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.exists()),
        };

        let config = match file {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                debug!("No configuration file, using defaults");
                Self::default()
            }
        };

        Ok(config.apply_env())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SumyError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| SumyError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SumyError::ConfigError(e.to_string()))
    }

    /// Overlay the API key from the process environment
    pub fn apply_env(self) -> Self {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let from_env = API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty());

        if let Some(key) = from_env {
            self.api_key = Some(key);
        }
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice_name = voice.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// The API key, or `CredentialsMissing` when absent or blank
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                SumyError::CredentialsMissing(format!("Set one of {}", API_KEY_VARS.join(", ")))
            })
    }

    pub fn setup_timeout(&self) -> Duration {
        Duration::from_secs(self.setup_timeout_secs)
    }

    /// Check structural settings. The API key is checked at connect time.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(SumyError::ConfigError("model must not be empty".into()));
        }
        if self.voice_name.trim().is_empty() {
            return Err(SumyError::ConfigError("voice_name must not be empty".into()));
        }
        if !(self.endpoint.starts_with("wss://") || self.endpoint.starts_with("ws://")) {
            return Err(SumyError::ConfigError(format!(
                "endpoint must be a ws:// or wss:// URL, got {}",
                self.endpoint
            )));
        }
        if self.input_sample_rate == 0 || self.output_sample_rate == 0 {
            return Err(SumyError::ConfigError("sample rates must be positive".into()));
        }
        if self.capture_chunk_size == 0 {
            return Err(SumyError::ConfigError("capture_chunk_size must be positive".into()));
        }
        if self.setup_timeout_secs == 0 {
            return Err(SumyError::ConfigError("setup_timeout_secs must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SumyConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.voice_name, "Fenrir");
        assert_eq!(config.input_sample_rate, 16000);
        assert_eq!(config.output_sample_rate, 24000);
        assert_eq!(config.capture_chunk_size, 4096);
        assert!(config.enable_transcription);
        assert!(config.validate().is_ok());
        assert!(matches!(config.api_key(), Err(SumyError::CredentialsMissing(_))));
    }

    #[test]
    fn test_partial_toml() {
        let config = SumyConfig::from_toml_str(
            r#"
            voice_name = "Puck"
            capture_chunk_size = 2048
            "#,
        )
        .unwrap();
        assert_eq!(config.voice_name, "Puck");
        assert_eq!(config.capture_chunk_size, 2048);
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            SumyConfig::from_toml_str("capture_chunk_size = \"big\""),
            Err(SumyError::ConfigError(_))
        ));
    }

    #[test]
    fn test_env_precedence() {
        let config = SumyConfig::default().apply_env_with(|name| match name {
            "GEMINI_API_KEY" => Some("primary".to_string()),
            "API_KEY" => Some("fallback".to_string()),
            _ => None,
        });
        assert_eq!(config.api_key().unwrap(), "primary");

        let config = SumyConfig::default().apply_env_with(|name| match name {
            "GEMINI_API_KEY" => Some("  ".to_string()),
            "API_KEY" => Some("fallback".to_string()),
            _ => None,
        });
        assert_eq!(config.api_key().unwrap(), "fallback");

        let config = SumyConfig::default()
            .with_api_key("from-file")
            .apply_env_with(|_| None);
        assert_eq!(config.api_key().unwrap(), "from-file");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(SumyConfig::default().with_endpoint("https://x").validate().is_err());
        assert!(SumyConfig::default().with_model(" ").validate().is_err());

        let mut config = SumyConfig::default();
        config.capture_chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", SumyConfig::default().with_api_key("secret"));
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn test_missing_file() {
        let result = SumyConfig::load(Some(Path::new("/nonexistent/sumy.toml")));
        assert!(matches!(result, Err(SumyError::ConfigError(_))));
    }
}
