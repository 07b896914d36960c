//! `reagent reflect` — draft/critique/refine an artifact.

use reagent_agent::ReflectionAgent;
use tracing::info;

pub async fn run(
    task: &str,
    max_iterations: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = super::load_settings()?;

    let provider = reagent_providers::build_from_settings(&settings);
    let mut agent = ReflectionAgent::new(provider, &settings.model, settings.temperature)
        .with_max_iterations(max_iterations.unwrap_or(settings.max_iterations));
    if let Some(max_tokens) = settings.max_tokens {
        agent = agent.with_max_tokens(max_tokens);
    }
    info!(model = %settings.model, "running reflect");

    let outcome = agent.run(task).await?;
    println!("{}", outcome.artifact);

    if outcome.degraded {
        eprintln!("(run cut short by a provider failure; this is the best artifact so far)");
    } else if outcome.converged {
        eprintln!("(converged after {} refinement round(s))", outcome.rounds);
    } else {
        eprintln!("(round bound reached after {} refinement round(s))", outcome.rounds);
    }

    Ok(())
}
