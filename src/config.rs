//! Configuration management for csvchat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{CsvChatError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Main configuration structure for csvchat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Chat stream consumption settings
    #[serde(default)]
    pub stream: StreamConfig,
    /// Logging output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API base. May be absolute (`http://host:8000/api`) or a path such as
    /// `/api`, in which case it is resolved against `origin`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Origin that relative bases are resolved against (the reverse proxy)
    #[serde(default = "default_origin")]
    pub origin: String,

    /// TCP connect timeout in seconds. Requests themselves have no overall
    /// deadline; see `StreamConfig::idle_timeout_seconds`.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "/api".to_string()
}

fn default_origin() -> String {
    "http://localhost:8000".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("csvchat/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            origin: default_origin(),
            connect_timeout_seconds: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    /// Resolve the effective API base URL
    ///
    /// Absolute bases are used as-is. Relative bases are joined onto
    /// `origin`. The returned URL never ends with a slash.
    ///
    /// # Examples
    ///
    /// ```
    /// use csvchat::config::ApiConfig;
    ///
    /// let api = ApiConfig::default();
    /// assert_eq!(api.resolved_base().unwrap(), "http://localhost:8000/api");
    /// ```
    pub fn resolved_base(&self) -> Result<String> {
        let base = self.base_url.trim();
        let url = match Url::parse(base) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let origin = Url::parse(self.origin.trim()).map_err(|e| {
                    CsvChatError::Config(format!("Invalid api.origin '{}': {}", self.origin, e))
                })?;
                origin.join(base)?
            }
            Err(e) => {
                return Err(
                    CsvChatError::Config(format!("Invalid api.base_url '{}': {}", base, e)).into(),
                )
            }
        };

        Ok(url.as_str().trim_end_matches('/').to_string())
    }

    /// Connect timeout as a `Duration`
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

/// Chat stream consumption configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Interpret a final record that arrives without a terminating newline.
    ///
    /// When false the residual record is discarded (and logged).
    #[serde(default)]
    pub flush_trailing_record: bool,

    /// Maximum seconds to wait for the next chunk before failing the turn.
    /// Unset means wait indefinitely.
    #[serde(default)]
    pub idle_timeout_seconds: Option<u64>,
}

impl StreamConfig {
    /// Per-chunk idle timeout, if configured
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_seconds.map(Duration::from_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON-formatted log lines instead of human-readable ones
    #[serde(default)]
    pub json: bool,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CsvChatError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| CsvChatError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("CSVCHAT_API_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(origin) = std::env::var("CSVCHAT_API_ORIGIN") {
            self.api.origin = origin;
        }

        if let Ok(flush) = std::env::var("CSVCHAT_FLUSH_TRAILING_RECORD") {
            match flush.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.stream.flush_trailing_record = true,
                "0" | "false" | "no" => self.stream.flush_trailing_record = false,
                other => {
                    tracing::warn!("Ignoring invalid CSVCHAT_FLUSH_TRAILING_RECORD: {}", other)
                }
            }
        }

        if let Ok(timeout) = std::env::var("CSVCHAT_IDLE_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.stream.idle_timeout_seconds = Some(value);
            } else {
                tracing::warn!("Ignoring invalid CSVCHAT_IDLE_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(json) = std::env::var("CSVCHAT_LOG_JSON") {
            self.logging.json = matches!(json.to_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(api_url) = &cli.api_url {
            tracing::debug!("Using API URL override from CLI: {}", api_url);
            self.api.base_url = api_url.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the API base cannot be resolved or a numeric
    /// setting is out of range
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(CsvChatError::Config("api.base_url cannot be empty".to_string()).into());
        }

        let resolved = self.api.resolved_base()?;
        if !resolved.starts_with("http://") && !resolved.starts_with("https://") {
            return Err(CsvChatError::Config(format!(
                "API base must use http or https: {}",
                resolved
            ))
            .into());
        }

        if self.api.connect_timeout_seconds == 0 {
            return Err(CsvChatError::Config(
                "api.connect_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.stream.idle_timeout_seconds == Some(0) {
            return Err(CsvChatError::Config(
                "stream.idle_timeout_seconds must be greater than 0 when set".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
