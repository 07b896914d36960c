//! Draft, critique, refine.
//!
//! The reflection loop produces an initial draft, then alternates
//! critique and refinement until the critique contains the
//! no-improvement sentinel or the round bound is hit. The latest
//! execution is always the answer.
//!
//! Only the initial draft failing is fatal: once at least one execution
//! exists, a mid-loop provider failure degrades to returning the best
//! artifact so far instead of erroring.

use crate::prompts;
use reagent_core::error::{Error, ProviderError};
use reagent_core::message::Message;
use reagent_core::provider::{GenerateRequest, Provider};
use reagent_core::trajectory::Trajectory;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The result of a reflection run.
#[derive(Debug)]
pub struct ReflectionOutcome {
    /// The latest execution: the refined artifact, or the draft when no
    /// refinement round completed.
    pub artifact: String,
    pub trajectory: Trajectory,
    /// Completed critique/refine rounds.
    pub rounds: usize,
    /// True when the critique contained the no-improvement sentinel.
    pub converged: bool,
    /// True when a mid-loop provider failure cut the run short and the
    /// artifact is the best result so far rather than a finished one.
    pub degraded: bool,
}

/// The self-refinement agent.
pub struct ReflectionAgent {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    max_iterations: usize,
}

impl ReflectionAgent {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            max_iterations: 3,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Run draft/critique/refine on a task.
    pub async fn run(&self, task: &str) -> Result<ReflectionOutcome, Error> {
        let mut trajectory = Trajectory::new(self.max_iterations);
        info!(task = %task, max_iterations = self.max_iterations, "starting reflection run");

        // No artifact exists yet, so a draft failure is fatal.
        let draft = self.generate(&prompts::draft_prompt(task)).await?;
        trajectory.push_execution(&draft);
        let mut current = draft;

        let mut rounds = 0usize;
        let mut converged = false;
        let mut degraded = false;

        while trajectory.tick() {
            let critique = match self.generate(&prompts::critique_prompt(task, &current)).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "critique failed, returning latest artifact");
                    degraded = true;
                    break;
                }
            };
            trajectory.push_reflection(&critique);

            if critique
                .to_lowercase()
                .contains(prompts::NO_IMPROVEMENT)
            {
                info!(rounds, "critique found nothing to improve");
                converged = true;
                break;
            }

            let refined = match self
                .generate(&prompts::refine_prompt(task, &current, &critique))
                .await
            {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "refinement failed, returning latest artifact");
                    degraded = true;
                    break;
                }
            };
            debug!(round = rounds + 1, "refinement produced");
            trajectory.push_execution(&refined);
            current = refined;
            rounds += 1;
        }

        Ok(ReflectionOutcome {
            artifact: current,
            trajectory,
            rounds,
            converged,
            degraded,
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String, Error> {
        let mut request =
            GenerateRequest::new(self.model.clone(), vec![Message::user(prompt)]);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;

        let generation = self.provider.generate(request).await?;
        if generation.text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse.into());
        }
        Ok(generation.text)
    }
}
