//! Single-action reasoning loop.
//!
//! One tool invocation per iteration: the model emits a `Thought:` line
//! and an `Action:` line, the action is dispatched, and the observation is
//! appended to the trajectory, which is re-rendered into the next prompt.
//! `Finish[answer]` terminates the run; so does the iteration bound.
//!
//! Failure handling follows the three-class taxonomy: provider failures
//! (including an empty generation) abort the run, tool failures come back
//! as observations, and unparsable responses get a corrective observation
//! and another chance.

use crate::dispatcher::Dispatcher;
use crate::parser::{self, Intent};
use crate::prompts;
use reagent_core::error::{Error, ProviderError};
use reagent_core::provider::{GenerateRequest, Provider};
use reagent_core::tool::{ToolInput, ToolRegistry};
use reagent_core::trajectory::Trajectory;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The model emitted `Finish[answer]`.
    Finished,
    /// The iteration bound was reached without a final answer.
    IterationLimit,
}

/// The result of one run: the answer (when one was produced), the full
/// trajectory, and accounting for callers that want to inspect the run.
#[derive(Debug)]
pub struct ReactOutcome {
    pub answer: Option<String>,
    pub trajectory: Trajectory,
    pub iterations: usize,
    pub tool_calls: usize,
    pub stop: StopReason,
}

/// The single-action agent. Cheap to construct; each [`run`](ReactAgent::run)
/// owns its own trajectory, so one agent can serve concurrent runs.
pub struct ReactAgent {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    tools: Arc<ToolRegistry>,
    max_iterations: usize,
    dispatcher: Dispatcher,
}

impl ReactAgent {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            max_iterations: 5,
            dispatcher: Dispatcher::default(),
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

    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Run the loop on a question until `Finish`, the iteration bound, or
    /// a provider failure.
    pub async fn run(&self, question: &str) -> Result<ReactOutcome, Error> {
        let mut trajectory = Trajectory::new(self.max_iterations);
        let mut tool_calls = 0usize;
        info!(question = %question, max_iterations = self.max_iterations, "starting run");

        while trajectory.tick() {
            let text = self.generate(question, &trajectory).await?;
            let parsed = parser::parse_response(&text);

            if let Some(thought) = &parsed.thought {
                debug!(iteration = trajectory.iterations, thought = %thought, "model thought");
                trajectory.push_thought(thought);
            }

            match parsed.intent {
                Intent::Finish { answer } => {
                    info!(iterations = trajectory.iterations, "run finished");
                    let iterations = trajectory.iterations;
                    return Ok(ReactOutcome {
                        answer: Some(answer),
                        trajectory,
                        iterations,
                        tool_calls,
                        stop: StopReason::Finished,
                    });
                }
                Intent::Invoke { name, argument } => {
                    trajectory.push_action(&format!("{name}[{argument}]"));
                    tool_calls += 1;
                    let observation = self
                        .dispatcher
                        .dispatch(&self.tools, &name, ToolInput::Text(argument))
                        .await;
                    debug!(tool = %name, observation = %observation, "tool observation");
                    trajectory.push_observation(&observation);
                }
                Intent::Unparsed => {
                    warn!(iteration = trajectory.iterations, "unparsable response, retrying");
                    trajectory.push_observation(prompts::UNPARSED_OBSERVATION);
                }
            }
        }

        info!(iterations = trajectory.iterations, "iteration bound reached without an answer");
        let iterations = trajectory.iterations;
        Ok(ReactOutcome {
            answer: None,
            trajectory,
            iterations,
            tool_calls,
            stop: StopReason::IterationLimit,
        })
    }

    async fn generate(&self, question: &str, trajectory: &Trajectory) -> Result<String, Error> {
        let prompt = prompts::react_prompt(&self.tools, question, &trajectory.render());
        let mut request = GenerateRequest::new(
            self.model.clone(),
            vec![reagent_core::Message::user(prompt)],
        );
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;

        let generation = self.provider.generate(request).await?;
        if generation.text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse.into());
        }
        Ok(generation.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ScriptedProvider;
    use reagent_core::trajectory::StepKind;

    fn echo_tools() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry.register_fn("echo", "Echoes back the input", |input| Ok(input.display()));
        Arc::new(registry)
    }

    fn agent(provider: ScriptedProvider) -> (Arc<ScriptedProvider>, ReactAgent) {
        let provider = Arc::new(provider);
        let agent = ReactAgent::new(provider.clone(), "test-model", 0.0, echo_tools());
        (provider, agent)
    }

    #[tokio::test]
    async fn immediate_finish_answers_in_one_iteration() {
        let (provider, agent) = agent(ScriptedProvider::texts(&[
            "Thought: I already know this.\nAction: Finish[42]",
        ]));

        let outcome = agent.run("What is 6 * 7?").await.unwrap();
        assert_eq!(outcome.answer.as_deref(), Some("42"));
        assert_eq!(outcome.stop, StopReason::Finished);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.tool_calls, 0);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn tool_invocation_feeds_back_an_observation() {
        let (provider, agent) = agent(ScriptedProvider::texts(&[
            "Thought: let me try the tool.\nAction: echo[hello]",
            "Thought: got it.\nAction: Finish[the echo said hello]",
        ]));

        let outcome = agent.run("test the echo tool").await.unwrap();
        assert_eq!(outcome.answer.as_deref(), Some("the echo said hello"));
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.tool_calls, 1);
        assert_eq!(provider.call_count(), 2);

        let observations: Vec<_> = outcome
            .trajectory
            .steps
            .iter()
            .filter(|s| s.kind == StepKind::Observation)
            .collect();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].content, "echo result: hello");
    }

    #[tokio::test]
    async fn unknown_tool_becomes_an_observation_not_an_error() {
        let (_, agent) = agent(ScriptedProvider::texts(&[
            "Action: teleport[home]",
            "Action: Finish[cannot teleport]",
        ]));

        let outcome = agent.run("go home").await.unwrap();
        assert_eq!(outcome.answer.as_deref(), Some("cannot teleport"));
        let rendered = outcome.trajectory.render();
        assert!(rendered.contains("Error: no tool named 'teleport' is registered."));
    }

    #[tokio::test]
    async fn unparsable_responses_exhaust_the_bound() {
        let (provider, agent) = agent(ScriptedProvider::texts(&[
            "I refuse to follow the format.",
            "Still not following it.",
        ]));
        let agent = agent.with_max_iterations(2);

        let outcome = agent.run("anything").await.unwrap();
        assert_eq!(outcome.answer, None);
        assert_eq!(outcome.stop, StopReason::IterationLimit);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(provider.call_count(), 2);
        assert_eq!(outcome.trajectory.count(StepKind::Observation), 2);
        assert!(outcome
            .trajectory
            .render()
            .contains("could not be parsed"));
    }

    #[tokio::test]
    async fn provider_failure_aborts_the_run() {
        let (_, agent) = agent(ScriptedProvider::new(vec![Err(
            ProviderError::ApiError {
                status_code: 500,
                message: "upstream down".into(),
            },
        )]));

        let err = agent.run("anything").await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[tokio::test]
    async fn empty_generation_is_a_provider_error() {
        let (_, agent) = agent(ScriptedProvider::texts(&["   \n  "]));
        let err = agent.run("anything").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Provider(ProviderError::EmptyResponse)
        ));
    }
}
