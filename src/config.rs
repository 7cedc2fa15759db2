use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TjaConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub suggest: SuggestConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub log_level: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub cache_dir: String,
}

/// Knobs for ranking, throttling, and the in-memory caches.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SuggestConfig {
    /// Maximum chips returned per suggestion.
    pub max_results: usize,
    /// Score bonus added to user records when ranking by similarity.
    pub user_bonus: f32,
    /// Requests allowed per rate window, shared by suggest and ingest.
    pub rate_limit_max: usize,
    pub rate_window_secs: u64,
    /// How long a caller waits for the worker before giving up.
    pub request_timeout_ms: u64,
    /// Number of recently ingested user embeddings kept resident.
    pub recent_cache_size: usize,
    pub mailbox_capacity: usize,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct UiConfig {
    /// Reveal the ranking method (`embedding` / `fuzzy`) on returned chips.
    pub show_method: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            log_level: "info".into(),
            host: "127.0.0.1".into(),
            port: 8765,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_tja_dir()
            .join("embeddings.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_tja_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            provider: "local".into(),
            model: "all-MiniLM-L6-v2".into(),
            cache_dir,
        }
    }
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            max_results: 8,
            user_bonus: 0.1,
            rate_limit_max: 10,
            rate_window_secs: 60,
            request_timeout_ms: 10_000,
            recent_cache_size: 20,
            mailbox_capacity: 64,
        }
    }
}

impl SuggestConfig {
    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Returns `~/.tja/`
pub fn default_tja_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".tja")
}

/// Returns the default config file path: `~/.tja/config.toml`
pub fn default_config_path() -> PathBuf {
    default_tja_dir().join("config.toml")
}

impl TjaConfig {
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
            TjaConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (TJA_DB, TJA_LOG_LEVEL, TJA_DEBUG).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TJA_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("TJA_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("TJA_DEBUG") {
            self.ui.show_method = matches!(val.as_str(), "1" | "true" | "TRUE" | "yes");
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
