use crate::error::PipelineError;
use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub openai: OpenAiConfig,
    pub output: OutputConfig,
    pub transcription: TranscriptionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key. The OPENAI_API_KEY environment variable takes precedence.
    pub api_key: Option<String>,
    pub api_base: String,
    pub transcription_model: String,
    pub generation_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory where produced audio, documents, and archived source audio
    /// are written. Created on demand.
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Upper bound on chunk uploads in flight at once.
    pub workers: usize,
    pub language: Option<String>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://api.openai.com/v1".to_string(),
            transcription_model: "whisper-1".to_string(),
            generation_model: "gpt-4-1106-preview".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            language: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = global::config_file()?;
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = global::config_file()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Resolve the effective API credential. An absent credential is a fatal
    /// startup condition, not something to retry.
    pub fn resolve_api_key(&self) -> Result<String, PipelineError> {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            let key = key.trim().to_string();
            if !key.is_empty() {
                return Ok(key);
            }
        }

        match &self.openai.api_key {
            Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(PipelineError::Configuration(
                "no API key: set OPENAI_API_KEY or openai.api_key in config.toml".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.openai.transcription_model, "whisper-1");
        assert_eq!(config.openai.generation_model, "gpt-4-1106-preview");
        assert_eq!(config.output.dir, PathBuf::from("output"));
        assert_eq!(config.transcription.workers, 4);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[openai]\napi_key = \"sk-test\"\n").unwrap();
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.openai.api_base, "https://api.openai.com/v1");
        assert_eq!(config.transcription.workers, 4);
    }
}
