//! CareerLens CLI, the main entry point.
//!
//! Commands:
//! - `onboard`   Write a default config file
//! - `serve`     Start the HTTP gateway
//! - `question`  Generate the next reflection question
//! - `save`      Record an answered question
//! - `history`   List past reflections, newest first
//! - `advice`    Synthesize advice from the whole history
//! - `doctor`    Diagnose configuration and connectivity

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "careerlens",
    about = "CareerLens: guided career self-reflection",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "CAREERLENS_LOG_JSON")]
    log_json: bool,

    /// Read configuration from this file instead of ~/.careerlens/config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Onboard,

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate the next reflection question
    Question,

    /// Record an answer to a question
    Save {
        #[arg(short, long)]
        question: String,

        #[arg(short, long)]
        answer: String,
    },

    /// List past reflections, newest first
    History {
        /// Show at most this many
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Synthesize career advice from the whole history
    Advice,

    /// Diagnose configuration and connectivity
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Onboard => commands::onboard::run(config_path).await?,
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Question => commands::question::run(config_path).await?,
        Commands::Save { question, answer } => {
            commands::save::run(config_path, question, answer).await?
        }
        Commands::History { limit } => commands::history::run(config_path, limit).await?,
        Commands::Advice => commands::advice::run(config_path).await?,
        Commands::Doctor => commands::doctor::run(config_path).await?,
    }

    Ok(())
}
