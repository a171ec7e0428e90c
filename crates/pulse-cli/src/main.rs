mod cmd;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pulse",
    about = "Analyze project delivery chat messages with Claude — extract insights, blockers, and project health",
    version,
    propagate_version = true
)]
struct Cli {
    /// Flat KEY=VALUE credentials file; the process environment fills in
    /// any keys the file does not define
    #[arg(long, global = true, env = "PULSE_ENV_FILE", default_value = ".env")]
    env_file: PathBuf,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze unprocessed messages and refresh project health
    Run {
        /// Project id (omit to process every project with unprocessed messages)
        #[arg(long)]
        project: Option<String>,
    },

    /// List projects with unprocessed messages
    Projects,

    /// Evaluate the health rules for a given set of signals
    Classify {
        /// Distinct blocker count
        #[arg(long)]
        blockers: usize,

        /// Mean sentiment score in [0, 1]
        #[arg(long)]
        sentiment: f64,

        /// Warning sign count
        #[arg(long, default_value = "0")]
        warning_signs: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Run { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Run { project } => cmd::run::run(&cli.env_file, project.as_deref(), cli.json),
        Commands::Projects => cmd::projects::run(&cli.env_file, cli.json),
        Commands::Classify {
            blockers,
            sentiment,
            warning_signs,
        } => cmd::classify::run(blockers, sentiment, warning_signs, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
