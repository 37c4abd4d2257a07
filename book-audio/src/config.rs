//! book-audio configuration management.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::text::DEFAULT_CHUNK_BUDGET;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAudioConfig {
    /// Glob pattern selecting which chapter titles to convert
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// TTS voice
    #[serde(default = "default_voice")]
    pub voice: String,

    /// TTS model
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Attempts per chunk before giving up on rate limiting
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between rate-limit retries, in seconds
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

fn default_pattern() -> String {
    "Chapter *".to_string()
}

fn default_voice() -> String {
    tts_client::DEFAULT_VOICE.to_string()
}

fn default_model() -> String {
    tts_client::DEFAULT_MODEL.to_string()
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_BUDGET
}

fn default_max_attempts() -> u32 {
    10
}

fn default_retry_delay_secs() -> u64 {
    5
}

impl Default for BookAudioConfig {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            voice: default_voice(),
            model: default_model(),
            chunk_size: default_chunk_size(),
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

impl BookAudioConfig {
    /// Config file path: ~/.config/book-audio/config.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("book-audio")
            .join("config.toml"))
    }

    /// Load config from file, returning defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: BookAudioConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}
