//! LLM provider implementations for reagent.
//!
//! The control loop only depends on the `Provider` trait from
//! `reagent-core`; this crate supplies the concrete transports.
//! `OpenAiCompatProvider` covers the vast majority of backends since most
//! expose an OpenAI-compatible `/v1/chat/completions` endpoint.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use reagent_config::Settings;
use reagent_core::Provider;
use std::sync::Arc;

/// Build the provider described by the settings.
pub fn build_from_settings(settings: &Settings) -> Arc<dyn Provider> {
    Arc::new(OpenAiCompatProvider::new(
        "openai-compat",
        &settings.base_url,
        settings.api_key.clone().unwrap_or_default(),
        std::time::Duration::from_secs(settings.request_timeout_secs),
    ))
}
