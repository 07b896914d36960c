//! Shared test fixtures for the loop tests.

use async_trait::async_trait;
use reagent_core::error::ProviderError;
use reagent_core::provider::{GenerateRequest, Generation, Provider};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A provider that replays a fixed sequence of responses, one per
/// `generate()` call. Panics if called more times than it was scripted
/// for, which catches loops that fail to terminate.
pub struct ScriptedProvider {
    responses: Mutex<Vec<Result<String, ProviderError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<String, ProviderError>>) -> Self {
        let mut responses = responses;
        responses.reverse(); // pop() from the back serves in order
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The requests received so far, in call order.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> Result<Generation, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop()
            .expect("scripted provider ran out of responses");
        next.map(|text| Generation {
            text,
            model: "scripted".to_string(),
            usage: None,
        })
    }
}
