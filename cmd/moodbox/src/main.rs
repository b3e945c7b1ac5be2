//! Moodbox CLI - offline tools for the mood engine.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{ClassifyCommand, ConfigCommand, RecognizeCommand, ReplayCommand};

/// Moodbox CLI - offline tools for the mood engine.
///
/// Subcommands:
///   - classify: label one set of smoothed features
///   - replay: run a recorded tick trace through the mood pipeline
///   - recognize: run the configured recognizer on a WAV file
///   - config: print the configuration
///
/// Configuration is read from ~/.moodbox/config.yaml unless --config is given.
#[derive(Parser)]
#[command(name = "moodbox")]
#[command(about = "Moodbox mood engine tool")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.moodbox/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify one set of features
    Classify(ClassifyCommand),
    /// Replay a recorded tick trace
    Replay(ReplayCommand),
    /// Run the recognizer on a WAV file
    Recognize(RecognizeCommand),
    /// Print the configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Classify(cmd) => cmd.run(&cli),
        Commands::Replay(cmd) => cmd.run(&cli),
        Commands::Recognize(cmd) => cmd.run(&cli).await,
        Commands::Config(cmd) => cmd.run(&cli),
    }
}
