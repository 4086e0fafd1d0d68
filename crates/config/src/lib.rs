//! Configuration loading, validation, and management for CareerLens.
//!
//! Loads configuration from `~/.careerlens/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use careerlens_core::Locale;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.careerlens/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language of prompts and user-facing messages
    #[serde(default)]
    pub locale: Locale,

    /// Reflection store configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// External generation service configuration
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("locale", &self.locale)
            .field("database", &self.database)
            .field("generation", &self.generation)
            .field("gateway", &self.gateway)
            .finish()
    }
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &redact(&self.api_key))
            .field("timeout_secs", &self.timeout_secs)
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `sqlite://...` or `postgres(ql)://...`
    #[serde(default = "default_database_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Startup connection attempts before giving up
    #[serde(default = "default_connect_attempts")]
    pub connect_attempts: u32,

    /// Fixed delay between startup connection attempts
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

fn default_database_url() -> String {
    "sqlite://career_reflections.db".into()
}
fn default_max_connections() -> u32 {
    4
}
fn default_connect_attempts() -> u32 {
    5
}
fn default_retry_delay_secs() -> u64 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            connect_attempts: default_connect_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

impl DatabaseConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Full URL of the chat-messages endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Bearer credential for the endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Value of the `user` field sent with every request
    #[serde(default = "default_user")]
    pub user: String,
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_user() -> String {
    "user".into()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
            user: default_user(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    5000
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Immutable settings handed to the generation client's constructor.
///
/// Only obtainable through [`AppConfig::generation_settings`], which
/// guarantees endpoint and credential are present.
#[derive(Clone)]
pub struct GenerationSettings {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
    pub user: String,
    pub locale: Locale,
}

impl std::fmt::Debug for GenerationSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .field("user", &self.user)
            .field("locale", &self.locale)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default location.
    ///
    /// Environment variables override the file:
    /// - `CAREERLENS_API_KEY`, then `DIFY_API_KEY`
    /// - `CAREERLENS_ENDPOINT`, then `DIFY_API_ENDPOINT`
    /// - `DATABASE_URL`
    /// - `CAREERLENS_LOCALE`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.database.url = normalize_database_url(&config.database.url);
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production, a map in tests).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("CAREERLENS_API_KEY").or_else(|| lookup("DIFY_API_KEY")) {
            self.generation.api_key = Some(key);
        }

        if let Some(endpoint) = lookup("CAREERLENS_ENDPOINT").or_else(|| lookup("DIFY_API_ENDPOINT")) {
            self.generation.endpoint = Some(endpoint);
        }

        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = normalize_database_url(&url);
        }

        if let Some(locale) = lookup("CAREERLENS_LOCALE") {
            self.locale = locale.parse().map_err(ConfigError::ValidationError)?;
        }

        self.validate()
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".careerlens")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "generation.timeout_secs must be greater than 0".into(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.database.connect_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "database.connect_attempts must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if the generation service is fully configured.
    pub fn has_generation_credentials(&self) -> bool {
        self.generation.api_key.is_some() && self.generation.endpoint.is_some()
    }

    /// Settings for the generation client. Fails when the endpoint or
    /// credential is missing: the service must not start without them.
    pub fn generation_settings(&self) -> Result<GenerationSettings, ConfigError> {
        let api_key = self
            .generation
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::ValidationError(
                    "generation api_key must be set (config.toml or DIFY_API_KEY)".into(),
                )
            })?;

        let endpoint = self
            .generation
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::ValidationError(
                    "generation endpoint must be set (config.toml or DIFY_API_ENDPOINT)".into(),
                )
            })?;

        Ok(GenerationSettings {
            endpoint,
            api_key,
            timeout: Duration::from_secs(self.generation.timeout_secs),
            user: self.generation.user.clone(),
            locale: self.locale,
        })
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            database: DatabaseConfig::default(),
            generation: GenerationConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Hosting platforms still hand out `postgres://` URLs; normalize them to
/// the `postgresql://` scheme.
pub fn normalize_database_url(url: &str) -> String {
    match url.strip_prefix("postgres://") {
        Some(rest) => format!("postgresql://{rest}"),
        None => url.to_string(),
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
