//! GR3 Link Daemon - Main entry point
//!
//! Serves the camera and recipe API to the web UI, or runs one command and exits.

mod api;
mod cli;
mod config;
mod server;
mod state;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::cli::RecipeCommand;
use crate::state::{AlertNotifier, AppState};

#[derive(Parser, Debug)]
#[command(name = "gr3link")]
#[command(about = "Companion daemon for the GR3 camera: photo browsing and recipe management")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "gr3link.toml")]
    config: PathBuf,

    /// Bind address for web server
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web server (default)
    Serve,
    /// Probe the camera once and report the resulting state
    Connect,
    /// Connect and list photos
    Photos,
    /// Manage recipes
    Recipes {
        #[command(subcommand)]
        action: RecipeCommand,
    },
    /// Write a default configuration file
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("GR3 Link v{}", env!("CARGO_PKG_VERSION"));

    let command = args.command.unwrap_or(Command::Serve);

    if let Command::InitConfig = command {
        config::save_default_config(&args.config)?;
        println!("Wrote {}", args.config.display());
        return Ok(());
    }

    // Load configuration
    let mut config = config::load_config(&args.config)?;

    // Override bind address if specified
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    info!(
        base_url = %config.device.base_url,
        mock = config.device.mock,
        "Configuration loaded"
    );

    match command {
        Command::Serve => {
            let state = AppState::new(config.clone(), None)?;
            server::run(state, &config.server.bind).await?;
        }
        Command::Connect => cli::connect(&interactive_state(config)?).await?,
        Command::Photos => cli::photos(&interactive_state(config)?).await?,
        Command::Recipes { action } => cli::recipes(&interactive_state(config)?, action).await?,
        Command::InitConfig => {}
    }

    Ok(())
}

fn interactive_state(config: config::Config) -> Result<Arc<AppState>> {
    AppState::new(config, Some(Arc::new(AlertNotifier)))
}
