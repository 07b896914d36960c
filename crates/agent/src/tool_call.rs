//! Multi-call conversational loop.
//!
//! The model embeds any number of `[TOOL_CALL:name:params]` tags in a
//! turn. All calls are dispatched in textual order, their results are sent
//! back in a single user message, and the cleaned turn text (tags removed)
//! is kept as the assistant message so the transcript reads naturally.
//! A turn with no calls is the final answer. When the iteration bound is
//! exhausted the model gets one extra forced turn to answer without tools.

use crate::dispatcher::Dispatcher;
use crate::parser;
use crate::prompts;
use reagent_core::error::{Error, ProviderError};
use reagent_core::message::Message;
use reagent_core::provider::{GenerateRequest, Provider};
use reagent_core::tool::ToolRegistry;
use reagent_core::trajectory::Trajectory;
use std::sync::Arc;
use tracing::{debug, info};

/// The result of one conversational run.
#[derive(Debug)]
pub struct ToolCallOutcome {
    pub answer: String,
    pub trajectory: Trajectory,
    pub iterations: usize,
    pub tool_calls: usize,
    /// True when the answer came from the forced final turn after the
    /// iteration bound, rather than from a voluntary tool-free turn.
    pub forced_final: bool,
}

/// The multi-call agent.
pub struct ToolCallAgent {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    tools: Arc<ToolRegistry>,
    max_iterations: usize,
    system_prompt: String,
    dispatcher: Dispatcher,
}

impl ToolCallAgent {
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
            system_prompt: prompts::TOOL_CALL_BASE_PROMPT.to_string(),
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

    /// Replace the default base system prompt. The tool protocol
    /// instructions are appended on top of whatever is set here.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Run the conversation until a tool-free turn, a provider failure,
    /// or the bound plus the forced final turn.
    pub async fn run(&self, input: &str) -> Result<ToolCallOutcome, Error> {
        let mut trajectory = Trajectory::new(self.max_iterations);
        let mut tool_calls = 0usize;
        let mut messages = vec![
            Message::system(prompts::tool_call_system_prompt(
                &self.system_prompt,
                &self.tools,
            )),
            Message::user(input),
        ];
        info!(input = %input, max_iterations = self.max_iterations, "starting conversation");

        while trajectory.tick() {
            let text = self.generate(&messages).await?;
            let (calls, residual) = parser::parse_inline_calls(&text);

            if calls.is_empty() {
                info!(iterations = trajectory.iterations, "final answer produced");
                let iterations = trajectory.iterations;
                return Ok(ToolCallOutcome {
                    answer: residual.trim().to_string(),
                    trajectory,
                    iterations,
                    tool_calls,
                    forced_final: false,
                });
            }

            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                trajectory.push_action(&format!("{}[{}]", call.name, call.params));
                tool_calls += 1;
                let input = parser::decode_params(&call.name, &call.params);
                let observation = self.dispatcher.dispatch(&self.tools, &call.name, input).await;
                debug!(tool = %call.name, observation = %observation, "tool observation");
                trajectory.push_observation(&observation);
                results.push(observation);
            }

            messages.push(Message::assistant(residual));
            messages.push(Message::user(format!(
                "Tool results:\n{}\n\nUse these results to continue. \
                 Answer directly once you have everything you need.",
                results.join("\n\n")
            )));
        }

        // Bound exhausted on a turn that still wanted tools: one last
        // generation with tools forbidden, so the caller always gets text.
        info!("iteration bound reached, forcing a final answer");
        messages.push(Message::user(prompts::FORCED_FINAL_PROMPT));
        let text = self.generate(&messages).await?;
        let (_, residual) = parser::parse_inline_calls(&text);
        let iterations = trajectory.iterations;
        Ok(ToolCallOutcome {
            answer: residual.trim().to_string(),
            trajectory,
            iterations,
            tool_calls,
            forced_final: true,
        })
    }

    async fn generate(&self, messages: &[Message]) -> Result<String, Error> {
        let mut request = GenerateRequest::new(self.model.clone(), messages.to_vec());
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
    use reagent_core::message::Role;
    use reagent_core::trajectory::StepKind;

    fn tools() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        // bare params decode under the "input" key
        registry.register_fn("echo", "Echoes back the input", |input| {
            Ok(input.get("input").unwrap_or("").to_string())
        });
        registry.register_fn("upper", "Uppercases the input", |input| {
            Ok(input.get("input").unwrap_or("").to_uppercase())
        });
        Arc::new(registry)
    }

    fn agent(provider: ScriptedProvider) -> (Arc<ScriptedProvider>, ToolCallAgent) {
        let provider = Arc::new(provider);
        let agent = ToolCallAgent::new(provider.clone(), "test-model", 0.0, tools());
        (provider, agent)
    }

    #[tokio::test]
    async fn tool_free_turn_is_the_final_answer() {
        let (provider, agent) =
            agent(ScriptedProvider::texts(&["Paris is the capital of France."]));

        let outcome = agent.run("capital of France?").await.unwrap();
        assert_eq!(outcome.answer, "Paris is the capital of France.");
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.tool_calls, 0);
        assert!(!outcome.forced_final);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn multiple_calls_in_one_turn_all_dispatch() {
        let (provider, agent) = agent(ScriptedProvider::texts(&[
            "Checking both. [TOOL_CALL:echo:hello][TOOL_CALL:upper:hello]",
            "One is plain, the other shouts.",
        ]));

        let outcome = agent.run("compare").await.unwrap();
        assert_eq!(outcome.answer, "One is plain, the other shouts.");
        assert_eq!(outcome.tool_calls, 2);
        assert_eq!(provider.call_count(), 2);
        assert_eq!(outcome.trajectory.count(StepKind::Action), 2);

        let observations: Vec<_> = outcome
            .trajectory
            .steps
            .iter()
            .filter(|s| s.kind == StepKind::Observation)
            .map(|s| s.content.as_str())
            .collect();
        assert_eq!(
            observations,
            vec!["echo result: hello", "upper result: HELLO"]
        );

        // both results travel back in a single user message, separated by
        // a blank line
        let requests = provider.requests();
        let feedback = requests[1]
            .messages
            .last()
            .expect("feedback turn has messages");
        assert_eq!(feedback.role, Role::User);
        assert!(feedback
            .content
            .contains("echo result: hello\n\nupper result: HELLO"));
    }

    #[tokio::test]
    async fn exhausted_bound_forces_one_final_turn() {
        let (provider, agent) = agent(ScriptedProvider::texts(&[
            "[TOOL_CALL:echo:one]",
            "[TOOL_CALL:echo:two]",
            "Final answer after running out of calls.",
        ]));
        let agent = agent.with_max_iterations(2);

        let outcome = agent.run("keep going").await.unwrap();
        assert_eq!(outcome.answer, "Final answer after running out of calls.");
        assert!(outcome.forced_final);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.tool_calls, 2);
        // two looped turns plus the forced one
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn forced_final_strips_stray_tags() {
        let (_, agent) = agent(ScriptedProvider::texts(&[
            "[TOOL_CALL:echo:one]",
            "Answer. [TOOL_CALL:echo:ignored]",
        ]));
        let agent = agent.with_max_iterations(1);

        let outcome = agent.run("go").await.unwrap();
        assert_eq!(outcome.answer, "Answer.");
        assert!(outcome.forced_final);
    }

    #[tokio::test]
    async fn provider_failure_aborts() {
        let (_, agent) = agent(ScriptedProvider::new(vec![Err(
            ProviderError::Network("connection refused".into()),
        )]));

        let err = agent.run("anything").await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }
}
