//! Distillery CLI: the main entry point.
//!
//! Commands:
//! - `onboard`: Write a default config file
//! - `serve`  : Start the chat gateway
//! - `chat`   : Talk to a running gateway from the terminal

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "distillery",
    about = "Distillery Labs site assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create ~/.distillery/config.toml with defaults
    Onboard,

    /// Start the chat gateway
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Chat with the assistant through a gateway
    Chat {
        /// Gateway chat endpoint (defaults to the configured one)
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.json_logs {
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

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Chat { endpoint, message } => commands::chat::run(endpoint, message).await?,
    }

    Ok(())
}
