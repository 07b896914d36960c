//! Provider trait — the abstraction over LLM backends.
//!
//! A Provider sends an ordered sequence of role-tagged messages to a
//! generation backend and returns the generated text. The control loop
//! only ever needs that plain text back: a backend may stream internally,
//! but the full text must arrive as a single logical return.
//!
//! Implementations: OpenAI-compatible endpoints (OpenAI, OpenRouter,
//! Ollama, vLLM, ...), plus scripted mocks in tests.

use crate::error::ProviderError;
use crate::message::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// The model to use (e.g. "gpt-4o-mini", "qwen2.5:7b")
    pub model: String,

    /// The ordered conversation messages
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Stop sequences
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,

    /// Whether the backend should stream. Streamed deltas are collected
    /// before returning — callers always get one complete [`Generation`].
    #[serde(default)]
    pub stream: bool,
}

fn default_temperature() -> f32 {
    0.7
}

impl GenerateRequest {
    /// Build a request with defaults for everything but model and messages.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: default_temperature(),
            max_tokens: None,
            stop: Vec::new(),
            stream: false,
        }
    }
}

/// A complete generation from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    /// The generated text
    pub text: String,

    /// Which model actually responded (may differ from requested)
    pub model: String,

    /// Token usage statistics, when the backend reports them
    pub usage: Option<Usage>,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// The loops call `generate()` without knowing which backend is in use.
/// Errors are final for the current run — retry/backoff for transient
/// failures is the implementation's responsibility, not the loop's.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g. "openai", "ollama").
    fn name(&self) -> &str;

    /// Send a request and get the complete generated text.
    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> std::result::Result<Generation, ProviderError>;

    /// Health check — can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}
