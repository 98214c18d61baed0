//! FileChat CLI — the main entry point.
//!
//! Commands:
//! - `chat`      — Interactive or single-message chat with project context
//! - `files`     — List or search the files a session would index
//! - `context`   — Show the context a message would attach, without sending it
//! - `config`    — Validate, show or locate the configuration
//! - `onboard`   — Write a default config file
//! - `doctor`    — Diagnose configuration and provider health
//! - `providers` — List supported LLM providers

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod input;

#[derive(Parser)]
#[command(
    name = "filechat",
    about = "FileChat — chat with an LLM about the project you are standing in",
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

#[derive(Subcommand)]
enum Commands {
    /// Chat about the current project
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Project root to index (defaults to the current directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Do not attach project files to messages
        #[arg(long)]
        no_context: bool,

        /// Wait for the complete reply instead of streaming it
        #[arg(long)]
        no_stream: bool,
    },

    /// List indexed project files, or those matching QUERY
    Files {
        query: Option<String>,

        #[arg(long)]
        root: Option<PathBuf>,

        /// Print the matching files as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the context that MESSAGE would attach
    Context {
        message: String,

        #[arg(long)]
        root: Option<PathBuf>,

        /// Print the pack report as JSON instead of the packed text
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Initialize configuration
    Onboard,

    /// Diagnose system health
    Doctor,

    /// List supported LLM providers
    Providers,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Check that the config file parses and passes validation
    Validate,
    /// Print the effective configuration (keys redacted)
    Show,
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Chat output goes to stdout; keep logs on stderr and quiet by default.
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Chat {
            message,
            root,
            no_context,
            no_stream,
        } => {
            commands::chat::run(commands::chat::ChatOptions {
                message,
                root,
                no_context,
                stream: !no_stream,
            })
            .await?
        }
        Commands::Files { query, root, json } => commands::files::run(query, root, json).await?,
        Commands::Context {
            message,
            root,
            json,
        } => commands::context_cmd::run(message, root, json).await?,
        Commands::Config { action } => match action {
            ConfigAction::Validate => commands::config_cmd::validate().await?,
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
        },
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Providers => commands::providers::run().await?,
    }

    Ok(())
}
