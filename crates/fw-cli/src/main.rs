//! Formwright CLI
//!
//! Single binary for Formwright operations:
//! - Inspect the tools an MCP server offers
//! - Run a scripted form-filling episode
//! - Manage configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use formwright::commands;
use fw_env::scripted::DEFAULT_FILL_TEXT;

#[derive(Parser)]
#[command(name = "formwright")]
#[command(author, version, about = "Form-filling browser environment for MCP tool servers")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// MCP server endpoint (overrides config)
    #[arg(short, long, global = true, env = "FORMWRIGHT_ENDPOINT")]
    endpoint: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tools offered by the MCP server
    Tools {
        /// Show tool arguments
        #[arg(short, long)]
        long: bool,
    },

    /// Run a scripted form-filling episode for a task file
    Run {
        /// Task file (JSON)
        task: PathBuf,
        /// Text typed into the form's input field
        #[arg(short, long, default_value = DEFAULT_FILL_TEXT)]
        text: String,
        /// Treat a text snapshot as ready during reset
        #[arg(long)]
        accept_text: bool,
        /// Fail on transport errors instead of carrying on
        #[arg(long)]
        strict: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show effective configuration
    Show,
    /// Get specific config value (e.g. env.settle_delay)
    Get { key: String },
    /// Write a configuration file with the defaults
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let load_settings = || commands::load_settings(cli.config.as_ref(), cli.endpoint.as_deref());

    match cli.command {
        Commands::Tools { long } => {
            let settings = load_settings()?;
            commands::tools_command(&settings.client, long).await?;
        }

        Commands::Run {
            task,
            text,
            accept_text,
            strict,
        } => {
            let mut settings = load_settings()?;
            settings.env.accept_text_observation |= accept_text;
            settings.env.strict |= strict;

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupted, cancelling episode");
                    on_interrupt.cancel();
                }
            });

            commands::run_command(&settings, &task, &text, cancel).await?;
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                commands::config_show(cli.config.as_ref(), &load_settings()?)?;
            }
            ConfigAction::Get { key } => {
                commands::config_get(&load_settings()?, &key)?;
            }
            ConfigAction::Init { force } => {
                commands::config_init(cli.config.as_ref(), force)?;
            }
            ConfigAction::Path => {
                commands::config_path(cli.config.as_ref());
            }
        },
    }

    Ok(())
}
