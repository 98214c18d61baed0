//! Configuration loading, validation, and management for FileChat.
//!
//! Loads configuration from `~/.filechat/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.filechat/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// System prompt sent ahead of every request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Retry policy for transient provider failures
    #[serde(default)]
    pub retry: RetryConfig,

    /// Project file context settings
    #[serde(default)]
    pub context: ContextConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "openrouter".into()
}
fn default_model() -> String {
    "anthropic/claude-sonnet-4".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_system_prompt() -> String {
    concat!(
        "You are FileChat, a helpful coding assistant working inside the user's project. ",
        "When project files are included with a message, ground your answer in them ",
        "and cite file paths. Be concise and direct."
    )
    .into()
}

/// Redact a secret for Debug output.
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
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("system_prompt", &self.system_prompt)
            .field("retry", &self.retry)
            .field("context", &self.context)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

/// Retry behaviour for rate limits, timeouts, and network failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 disables retrying)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry; doubles on each subsequent one
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Per-attempt timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_retries() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    500
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Default character budget for the file blocks of one request.
pub const DEFAULT_BUDGET_CHARS: usize = 8000;
/// Characters kept from a single file before it is truncated.
pub const DEFAULT_MAX_FILE_CHARS: usize = 2000;
/// Directories nested deeper than this below the root are not listed.
pub const DEFAULT_MAX_SCAN_DEPTH: usize = 5;
/// Files above this size are never indexed (1 MiB).
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 1024 * 1024;
/// Files taken per topic keyword.
pub const DEFAULT_KEYWORD_MATCH_LIMIT: usize = 3;
/// Trailing turns (any role) inspected for earlier file mentions.
pub const DEFAULT_CONTINUITY_WINDOW: usize = 4;

/// Settings for selecting and packing project files into each request.
///
/// The cutoffs below cap cost and noise. Changing them alters which files
/// reach the model, so the defaults are the tested values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Attach project files to messages at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Character budget for the file blocks of one request
    #[serde(default = "default_budget_chars")]
    pub budget_chars: usize,

    /// Characters kept from a single file before it is truncated
    #[serde(default = "default_max_file_chars")]
    pub max_file_chars: usize,

    /// How deep below the project root the scan descends
    #[serde(default = "default_max_scan_depth")]
    pub max_scan_depth: usize,

    /// Files larger than this are never indexed
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,

    /// Matches taken per topic keyword
    #[serde(default = "default_keyword_match_limit")]
    pub keyword_match_limit: usize,

    /// Trailing turns (any role) searched for earlier file mentions
    #[serde(default = "default_continuity_window")]
    pub continuity_window: usize,

    /// Turns retained in the running conversation
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_true() -> bool {
    true
}
fn default_budget_chars() -> usize {
    DEFAULT_BUDGET_CHARS
}
fn default_max_file_chars() -> usize {
    DEFAULT_MAX_FILE_CHARS
}
fn default_max_scan_depth() -> usize {
    DEFAULT_MAX_SCAN_DEPTH
}
fn default_max_file_size_bytes() -> u64 {
    DEFAULT_MAX_FILE_SIZE_BYTES
}
fn default_keyword_match_limit() -> usize {
    DEFAULT_KEYWORD_MATCH_LIMIT
}
fn default_continuity_window() -> usize {
    DEFAULT_CONTINUITY_WINDOW
}
fn default_history_limit() -> usize {
    filechat_core::message::DEFAULT_HISTORY_LIMIT
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            budget_chars: default_budget_chars(),
            max_file_chars: default_max_file_chars(),
            max_scan_depth: default_max_scan_depth(),
            max_file_size_bytes: default_max_file_size_bytes(),
            keyword_match_limit: default_keyword_match_limit(),
            continuity_window: default_continuity_window(),
            history_limit: default_history_limit(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.filechat/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `FILECHAT_API_KEY` (highest priority)
    /// - `OPENROUTER_API_KEY`
    /// - `OPENAI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
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

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("FILECHAT_API_KEY")
                .or_else(|| lookup("OPENROUTER_API_KEY"))
                .or_else(|| lookup("OPENAI_API_KEY"));
        }

        if let Some(provider) = lookup("FILECHAT_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("FILECHAT_MODEL") {
            self.default_model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".filechat")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.context.budget_chars == 0 {
            return Err(ConfigError::ValidationError(
                "context.budget_chars must be > 0".into(),
            ));
        }

        if self.context.max_file_chars == 0 {
            return Err(ConfigError::ValidationError(
                "context.max_file_chars must be > 0".into(),
            ));
        }

        if self.context.history_limit == 0 {
            return Err(ConfigError::ValidationError(
                "context.history_limit must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
            || self
                .providers
                .get(&self.default_provider)
                .is_some_and(|p| p.api_key.is_some())
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
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
            retry: RetryConfig::default(),
            context: ContextConfig::default(),
            providers: HashMap::new(),
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
