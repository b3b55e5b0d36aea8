//! Configuration loading, validation, and management for Distillery.
//!
//! Loads configuration from `~/.distillery/config.toml` with environment
//! variable overrides. Validates all settings at startup; the result is
//! immutable for the life of the process.

use distillery_core::provider::UserLocation;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.distillery/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Credential for the generation capability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model used for every turn
    #[serde(default = "default_model")]
    pub model: String,

    /// Max output tokens per turn
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Web search location hint
    #[serde(default)]
    pub search: SearchConfig,

    /// Assistant persona and canned messages
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Chat client configuration
    #[serde(default)]
    pub client: ClientConfig,
}

fn default_model() -> String {
    "claude-haiku-4-5-20251001".into()
}
fn default_max_tokens() -> u32 {
    1024
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
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("gateway", &self.gateway)
            .field("search", &self.search)
            .field("assistant", &self.assistant)
            .field("client", &self.client)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Value of `Access-Control-Allow-Origin` on every response
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

fn default_port() -> u16 {
    3000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_allowed_origin() -> String {
    "*".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origin: default_allowed_origin(),
        }
    }
}

/// Approximate location passed to the web search tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_city")]
    pub city: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default = "default_country")]
    pub country: String,

    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_city() -> String {
    "Peoria".into()
}
fn default_region() -> String {
    "Illinois".into()
}
fn default_country() -> String {
    "US".into()
}
fn default_timezone() -> String {
    "America/Chicago".into()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            city: default_city(),
            region: default_region(),
            country: default_country(),
            timezone: default_timezone(),
        }
    }
}

impl SearchConfig {
    pub fn user_location(&self) -> UserLocation {
        UserLocation {
            city: self.city.clone(),
            region: self.region.clone(),
            country: self.country.clone(),
            timezone: self.timezone.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Replace the built-in system prompt entirely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,

    /// First transcript entry shown by the widget (never sent)
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Shown in place of a reply when a turn fails
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
}

fn default_greeting() -> String {
    "I'm the Distillery AI. Ask me anything about our programs, resources, or how we can help your startup.".into()
}
fn default_fallback_message() -> String {
    "Sorry, I encountered an error. Please try again.".into()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            system_prompt_override: None,
            greeting: default_greeting(),
            fallback_message: default_fallback_message(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Where the chat client posts turns
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:3000/api/chat".into()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.distillery/config.toml).
    ///
    /// Also checks environment variables:
    /// - `DISTILLERY_API_KEY`, then `ANTHROPIC_API_KEY` (when no key in file)
    /// - `DISTILLERY_MODEL`
    /// - `DISTILLERY_PORT`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("DISTILLERY_API_KEY")
                .ok()
                .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("DISTILLERY_MODEL") {
            config.model = model;
        }

        if let Ok(port) = std::env::var("DISTILLERY_PORT") {
            config.gateway.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!("DISTILLERY_PORT is not a port: {port}"))
            })?;
        }

        config.validate()?;
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

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".distillery")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be greater than 0".into(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError("model must not be empty".into()));
        }

        if self.assistant.greeting.is_empty() || self.assistant.fallback_message.is_empty() {
            return Err(ConfigError::ValidationError(
                "assistant greeting and fallback_message must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            gateway: GatewayConfig::default(),
            search: SearchConfig::default(),
            assistant: AssistantConfig::default(),
            client: ClientConfig::default(),
        }
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
