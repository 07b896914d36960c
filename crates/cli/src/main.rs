//! Reagent CLI — the main entry point.
//!
//! Commands:
//! - `ask`     — Answer a question with a tool-using agent loop
//! - `reflect` — Produce an artifact via draft/critique/refine
//! - `tools`   — List the built-in tools

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(
    name = "reagent",
    about = "Reagent — LLM reasoning and tool-use control loops",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Which control loop `ask` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Single-action reasoning: Thought / Action / Observation
    React,
    /// Conversational multi-call tool protocol
    Tools,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question using tools
    Ask {
        /// The question to answer
        question: String,

        /// Which control loop to use
        #[arg(short, long, value_enum, default_value_t = Mode::React)]
        mode: Mode,

        /// Override the iteration bound
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Print the full trajectory after the answer
        #[arg(short, long)]
        trace: bool,
    },

    /// Refine an artifact through self-critique
    Reflect {
        /// The task to complete
        task: String,

        /// Override the critique/refine round bound
        #[arg(long)]
        max_iterations: Option<usize>,
    },

    /// List the built-in tools
    Tools,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Ask {
            question,
            mode,
            max_iterations,
            trace,
        } => commands::ask::run(&question, mode, max_iterations, trace).await?,
        Commands::Reflect {
            task,
            max_iterations,
        } => commands::reflect::run(&task, max_iterations).await?,
        Commands::Tools => commands::tools::run(),
    }

    Ok(())
}
