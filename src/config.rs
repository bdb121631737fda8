//! Engine configuration loaded from TOML.

use crate::games::omok::{DEFAULT_SIZE, MAX_SIZE, MIN_SIZE};
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Environment variable overriding [`RemoteConfig::base_url`].
pub const REMOTE_URL_ENV: &str = "OMOK_REMOTE_URL";

/// Settings for the remote opponent service.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", into)]
pub struct RemoteConfig {
    /// Base URL the `new/` and `play/` paths are resolved against.
    #[serde(default = "default_base_url")]
    base_url: String,

    /// Strategy name sent with `new/?strategy=`.
    #[serde(default = "default_strategy")]
    strategy: String,

    /// Per-request deadline in milliseconds.
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,
}

fn default_base_url() -> String {
    "https://www.cs.utep.edu/cheon/cs3360/project/omok/".to_string()
}

fn default_strategy() -> String {
    "Random".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_board_size() -> usize {
    DEFAULT_SIZE
}

impl RemoteConfig {
    /// Request deadline as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            strategy: default_strategy(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct OmokConfig {
    /// Board edge length.
    #[serde(default = "default_board_size")]
    board_size: usize,

    /// Remote opponent settings.
    #[serde(default)]
    remote: RemoteConfig,
}

impl Default for OmokConfig {
    fn default() -> Self {
        Self {
            board_size: default_board_size(),
            remote: RemoteConfig::default(),
        }
    }
}

impl OmokConfig {
    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(board_size = config.board_size, base_url = %config.remote.base_url, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!("No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Applies [`REMOTE_URL_ENV`] if set.
    #[instrument(skip(self))]
    pub fn apply_env(mut self) -> Self {
        if let Ok(url) = std::env::var(REMOTE_URL_ENV) {
            debug!(%url, "Remote URL overridden from environment");
            self.remote.base_url = url;
        }
        self
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size < MIN_SIZE {
            warn!(board_size = self.board_size, "Board too small");
            return Err(ConfigError::new(format!(
                "board_size must be at least {}, got {}",
                MIN_SIZE, self.board_size
            )));
        }
        if self.board_size > MAX_SIZE {
            warn!(board_size = self.board_size, "Board too large");
            return Err(ConfigError::new(format!(
                "board_size must be at most {}, got {}",
                MAX_SIZE, self.board_size
            )));
        }
        if self.remote.timeout_ms == 0 {
            return Err(ConfigError::new("remote.timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
