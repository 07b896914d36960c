//! `reagent ask` — answer a question with a tool-using loop.

use crate::Mode;
use reagent_agent::dispatcher::Dispatcher;
use reagent_agent::{ReactAgent, StopReason, ToolCallAgent};
use reagent_core::trajectory::{StepKind, Trajectory};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub async fn run(
    question: &str,
    mode: Mode,
    max_iterations: Option<usize>,
    trace: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = super::load_settings()?;

    let provider = reagent_providers::build_from_settings(&settings);
    let tools = Arc::new(reagent_tools::default_registry(
        settings.search_api_key.clone(),
    ));
    let dispatcher = Dispatcher::new(Duration::from_secs(settings.tool_timeout_secs));
    let max_iterations = max_iterations.unwrap_or(settings.max_iterations);
    info!(model = %settings.model, ?mode, max_iterations, "running ask");

    match mode {
        Mode::React => {
            let mut agent =
                ReactAgent::new(provider, &settings.model, settings.temperature, tools)
                    .with_max_iterations(max_iterations)
                    .with_dispatcher(dispatcher);
            if let Some(max_tokens) = settings.max_tokens {
                agent = agent.with_max_tokens(max_tokens);
            }

            let outcome = agent.run(question).await?;
            match outcome.answer {
                Some(answer) => println!("{answer}"),
                None => eprintln!(
                    "No answer after {} iterations ({} tool calls).",
                    outcome.iterations, outcome.tool_calls
                ),
            }
            if trace {
                print_trace(&outcome.trajectory);
            }
            if outcome.stop == StopReason::IterationLimit {
                std::process::exit(1);
            }
        }
        Mode::Tools => {
            let mut agent =
                ToolCallAgent::new(provider, &settings.model, settings.temperature, tools)
                    .with_max_iterations(max_iterations)
                    .with_dispatcher(dispatcher);
            if let Some(max_tokens) = settings.max_tokens {
                agent = agent.with_max_tokens(max_tokens);
            }

            let outcome = agent.run(question).await?;
            println!("{}", outcome.answer);
            if trace {
                print_trace(&outcome.trajectory);
            }
        }
    }

    Ok(())
}

fn print_trace(trajectory: &Trajectory) {
    eprintln!();
    eprintln!("--- trajectory ({} steps) ---", trajectory.len());
    for step in &trajectory.steps {
        let label = match step.kind {
            StepKind::Thought => "thought",
            StepKind::Action => "action",
            StepKind::Observation => "observation",
            StepKind::Execution => "execution",
            StepKind::Reflection => "reflection",
        };
        eprintln!("[{label}] {}", step.content);
    }
}
