//! TOML Configuration File Support
//!
//! Configuration loading for the support bot, with an optional TOML file at
//! `~/.config/dream11-support/config.toml`.
//!
//! # Configuration Priority
//!
//! Values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! The defaults point at the local development backend, so a missing file
//! and an empty environment give a working setup.
//!
//! # Example Configuration
//!
//! ```toml
//! [api]
//! base_url = "https://support.example.com"
//! chat_path = "/api/chat"
//! health_path = "/api/health"
//! request_timeout_secs = 30
//! send_session_id = true
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default chat endpoint path
pub const DEFAULT_CHAT_PATH: &str = "/api/chat";

/// Default health endpoint path
pub const DEFAULT_HEALTH_PATH: &str = "/api/health";

/// Environment variable names
pub mod env {
    /// Backend base URL
    pub const API_BASE_URL: &str = "SUPPORTBOT_API_BASE_URL";
    /// Chat endpoint path
    pub const CHAT_PATH: &str = "SUPPORTBOT_CHAT_PATH";
    /// Health endpoint path
    pub const HEALTH_PATH: &str = "SUPPORTBOT_HEALTH_PATH";
    /// Request timeout in seconds
    pub const REQUEST_TIMEOUT: &str = "SUPPORTBOT_REQUEST_TIMEOUT";
    /// Whether to send the session ID with each message
    pub const SEND_SESSION_ID: &str = "SUPPORTBOT_SEND_SESSION_ID";
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where the configuration came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[api]` section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiToml {
    /// Backend base URL
    pub base_url: Option<String>,

    /// Chat endpoint path
    pub chat_path: Option<String>,

    /// Health endpoint path
    pub health_path: Option<String>,

    /// Request timeout in seconds
    pub request_timeout_secs: Option<u64>,

    /// Whether to send the session ID with each message
    pub send_session_id: Option<bool>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportBotToml {
    /// API section
    pub api: ApiToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Where and how to reach the support backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://127.0.0.1:8000`
    pub base_url: String,
    /// Chat endpoint path, joined onto the base URL
    pub chat_path: String,
    /// Health endpoint path, joined onto the base URL
    pub health_path: String,
    /// Per-request timeout (`None` = wait indefinitely)
    pub request_timeout: Option<Duration>,
    /// Include `session_id` in the chat request body
    pub send_session_id: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            request_timeout: None,
            send_session_id: false,
        }
    }
}

impl ApiConfig {
    /// Create a configuration pointing at `base_url` with default paths
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Full URL of the chat endpoint
    #[must_use]
    pub fn chat_url(&self) -> String {
        join_url(&self.base_url, &self.chat_path)
    }

    /// Full URL of the health endpoint
    #[must_use]
    pub fn health_url(&self) -> String {
        join_url(&self.base_url, &self.health_path)
    }

    /// Check the values are usable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "base_url must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        for (name, path) in [
            ("chat_path", &self.chat_path),
            ("health_path", &self.health_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must start with '/', got {path:?}"
                )));
            }
        }
        if self.request_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// Fully resolved configuration
#[derive(Clone, Debug)]
pub struct SupportBotConfig {
    /// Backend connection settings
    pub api: ApiConfig,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Highest-priority source that contributed a value
    source: ConfigSource,
}

impl Default for SupportBotConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl SupportBotConfig {
    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/dream11-support/config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("dream11-support").join("config.toml"))
}

/// Load configuration from the default file and the process environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the merged values fail validation. A missing file is not an error.
pub fn load_config() -> Result<SupportBotConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path and the process environment
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<SupportBotConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration with a custom environment lookup
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_with_env<F>(
    path: Option<PathBuf>,
    lookup: F,
) -> Result<SupportBotConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = SupportBotConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: SupportBotToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(path = %config_path.display(), "Loaded configuration from file");
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, lookup);
    config.api.validate()?;

    Ok(config)
}

fn apply_toml_config(config: &mut SupportBotConfig, toml: &SupportBotToml) {
    let api = &toml.api;
    if let Some(ref url) = api.base_url {
        config.api.base_url = url.clone();
    }
    if let Some(ref path) = api.chat_path {
        config.api.chat_path = path.clone();
    }
    if let Some(ref path) = api.health_path {
        config.api.health_path = path.clone();
    }
    if let Some(secs) = api.request_timeout_secs {
        config.api.request_timeout = Some(Duration::from_secs(secs));
    }
    if let Some(enabled) = api.send_session_id {
        config.api.send_session_id = enabled;
    }
}

fn apply_env_config<F>(config: &mut SupportBotConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(env::API_BASE_URL) {
        config.api.base_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(path) = lookup(env::CHAT_PATH) {
        config.api.chat_path = path;
        config.source = ConfigSource::Env;
    }
    if let Some(path) = lookup(env::HEALTH_PATH) {
        config.api.health_path = path;
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = lookup(env::REQUEST_TIMEOUT) {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.api.request_timeout = Some(Duration::from_secs(secs));
            config.source = ConfigSource::Env;
        } else {
            tracing::warn!(value = %timeout, "Ignoring unparseable {}", env::REQUEST_TIMEOUT);
        }
    }
    if let Some(enabled) = lookup(env::SEND_SESSION_ID) {
        config.api.send_session_id = enabled == "1" || enabled.eq_ignore_ascii_case("true");
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Command-line overrides, applied after [`load_config`]
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Base URL override
    pub base_url: Option<String>,

    /// Session ID flag override
    pub send_session_id: Option<bool>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL override
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set session ID flag override
    #[must_use]
    pub fn with_send_session_id(mut self, enabled: bool) -> Self {
        self.send_session_id = Some(enabled);
        self
    }

    /// Apply overrides to a configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if an override is invalid.
    pub fn apply(&self, config: &mut SupportBotConfig) -> Result<(), ConfigError> {
        if self.base_url.is_some() || self.send_session_id.is_some() {
            config.source = ConfigSource::Cli;
        }
        if let Some(ref url) = self.base_url {
            config.api.base_url = url.clone();
        }
        if let Some(enabled) = self.send_session_id {
            config.api.send_session_id = enabled;
        }
        config.api.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
