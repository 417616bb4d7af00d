use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::review::types::{MAX_DIFFICULTY, MIN_DIFFICULTY};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FlashdeckConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub review: ReviewConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReviewConfig {
    /// Difficulty a new flashcard starts at (clamped to 1..=5).
    pub baseline_difficulty: u8,
    /// Default page size for flashcard listings.
    pub page_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_flashdeck_dir()
            .join("flashdeck.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            baseline_difficulty: MIN_DIFFICULTY,
            page_size: 10,
        }
    }
}

impl ReviewConfig {
    pub fn baseline(&self) -> u8 {
        self.baseline_difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
    }
}

/// Returns `~/.flashdeck/`
pub fn default_flashdeck_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".flashdeck")
}

/// Returns the default config file path: `~/.flashdeck/config.toml`
pub fn default_config_path() -> PathBuf {
    default_flashdeck_dir().join("config.toml")
}

impl FlashdeckConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            FlashdeckConfig::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (FLASHDECK_DB, FLASHDECK_LOG_LEVEL, FLASHDECK_HOST, FLASHDECK_PORT).
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("FLASHDECK_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("FLASHDECK_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("FLASHDECK_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("FLASHDECK_PORT") {
            self.server.port = val
                .parse()
                .with_context(|| format!("FLASHDECK_PORT is not a valid port: {val}"))?;
        }
        Ok(())
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
