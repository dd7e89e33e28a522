//! wordquiz CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wordquiz_core::{Difficulty, Direction};

mod commands;

#[derive(Parser)]
#[command(
    name = "wordquiz",
    version,
    about = "English vocabulary quizzes generated by an LLM"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a quiz in the terminal
    Play {
        /// Difficulty for the first round: beginner, intermediate, advanced
        #[arg(long)]
        difficulty: Option<Difficulty>,

        /// Direction for the first round: word-to-meaning, meaning-to-word
        #[arg(long)]
        direction: Option<Direction>,

        /// Provider name from the config (e.g. "gemini", "openai")
        #[arg(long)]
        provider: Option<String>,

        /// Model to generate questions with
        #[arg(long)]
        model: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory for result files
        #[arg(long)]
        output: Option<PathBuf>,

        /// Also write an HTML results page next to the CSV
        #[arg(long)]
        html: bool,
    },

    /// Print the instruction that would be sent to the model
    Prompt {
        #[arg(long)]
        difficulty: Difficulty,

        #[arg(long)]
        direction: Direction,

        /// Number of pairs to ask for
        #[arg(long, default_value_t = wordquiz_core::BATCH_SIZE)]
        count: usize,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config file
    Init,
}

#[tokio::main]
async fn main() {
    // stdout carries the quiz itself, so diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wordquiz=warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            difficulty,
            direction,
            provider,
            model,
            config,
            output,
            html,
        } => {
            commands::play::execute(commands::play::PlayOptions {
                difficulty,
                direction,
                provider,
                model,
                config,
                output,
                html,
            })
            .await
        }
        Commands::Prompt {
            difficulty,
            direction,
            count,
        } => commands::prompt::execute(difficulty, direction, count),
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
