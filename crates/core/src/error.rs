//! Error types for the reagent domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.
//!
//! The failure taxonomy the loops rely on:
//! - [`ProviderError`] — a failed or empty generation. Fatal to the current
//!   run; it is the only class that escapes a loop's `run` method.
//! - [`ToolError`] — a failed tool invocation. Recoverable: the dispatcher
//!   converts it into an observation string the model sees next iteration.
//! - Parse failures are not errors at all — the parser returns an
//!   `Unparsed` intent and the loop feeds back a corrective observation.

use thiserror::Error;

/// The top-level error type for all reagent operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider returned an empty response")]
    EmptyResponse,

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// A failed tool invocation. Absent tools and timeouts are handled at the
/// dispatch boundary, not here — handlers only report their own failures.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn empty_response_is_a_provider_error() {
        let err = Error::from(ProviderError::EmptyResponse);
        assert!(matches!(err, Error::Provider(ProviderError::EmptyResponse)));
    }

    #[test]
    fn tool_error_displays_correctly() {
        let err = Error::Tool(ToolError::ExecutionFailed {
            tool_name: "search".into(),
            reason: "backend unreachable".into(),
        });
        assert!(err.to_string().contains("search"));
        assert!(err.to_string().contains("backend unreachable"));
    }
}
