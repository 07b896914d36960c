//! Configuration loading and validation for reagent.
//!
//! Settings come from an optional TOML file (`~/.reagent/config.toml` by
//! default) with environment variable overrides applied on top:
//!
//! - `LLM_MODEL_ID`, `LLM_API_KEY`, `LLM_BASE_URL`, `LLM_TIMEOUT`
//! - `SERPAPI_API_KEY` (for the search tool)
//!
//! Environment always wins over the file. Secrets are redacted from
//! `Debug` output.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The root settings structure. Maps directly to `config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Default model id sent to the provider
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key for the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Hard cap on loop iterations per run
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// HTTP request timeout for provider calls, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout applied at the tool-invocation boundary, in seconds
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,

    /// SerpAPI key for the search tool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_api_key: Option<String>,
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_iterations() -> usize {
    5
}
fn default_request_timeout() -> u64 {
    120
}
fn default_tool_timeout() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key: None,
            temperature: default_temperature(),
            max_tokens: None,
            max_iterations: default_max_iterations(),
            request_timeout_secs: default_request_timeout(),
            tool_timeout_secs: default_tool_timeout(),
            search_api_key: None,
        }
    }
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_iterations", &self.max_iterations)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("tool_timeout_secs", &self.tool_timeout_secs)
            .field("search_api_key", &redact(&self.search_api_key))
            .finish()
    }
}

impl Settings {
    /// The default config directory: `~/.reagent`.
    pub fn config_dir() -> PathBuf {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".reagent")
    }

    /// Load settings from the default location, then apply env overrides.
    /// A missing file is not an error — defaults are used.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_dir().join("config.toml");
        let mut settings = if path.is_file() {
            Self::from_path(&path)?
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };
        settings.apply_env();
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a specific TOML file (no env overrides).
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment variable overrides on top of the current values.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup. An unparseable
    /// `LLM_TIMEOUT` is ignored rather than an error.
    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(model) = get("LLM_MODEL_ID") {
            self.model = model;
        }
        if let Some(url) = get("LLM_BASE_URL") {
            self.base_url = url;
        }
        if let Some(key) = get("LLM_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(timeout) = get("LLM_TIMEOUT")
            && let Ok(secs) = timeout.parse()
        {
            self.request_timeout_secs = secs;
        }
        if let Some(key) = get("SERPAPI_API_KEY") {
            self.search_api_key = Some(key);
        }
    }

    /// Validate value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::Invalid("max_iterations must be > 0".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature must be in [0.0, 2.0], got {}",
                self.temperature
            )));
        }
        if self.request_timeout_secs == 0 || self.tool_timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be > 0".into()));
        }
        Ok(())
    }
}
