//! foliochat terminal client entry point.
//!
//! Parses CLI arguments, wires the HTTP transports and local state store
//! into a session controller, then runs the interactive chat loop.

mod chat;
mod commands;
mod input;
mod render;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use foliochat_core::controller::SessionController;
use foliochat_infra::http::{HttpStreamTransport, HttpSyncTransport};
use foliochat_infra::kv::JsonFileStore;
use foliochat_types::config::ApiConfig;

/// Chat with the portfolio assistant from your terminal.
#[derive(Parser)]
#[command(name = "foliochat", version, about, long_about = None)]
struct Cli {
    /// Base URL of the chat API (version suffixes are stripped).
    #[arg(long, env = foliochat_types::config::API_URL_ENV)]
    api_url: Option<String>,

    /// Path of the local state file (defaults to the platform data dir).
    #[arg(long, env = "FOLIOCHAT_STATE_FILE")]
    state_file: Option<PathBuf>,

    /// Suppress all output except errors.
    #[arg(long)]
    quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,foliochat=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let config = match cli.api_url {
        Some(url) => ApiConfig::new(&url),
        None => ApiConfig::from_env(),
    };
    tracing::debug!(base_url = config.base_url(), "resolved api config");

    let state_path = cli
        .state_file
        .or_else(JsonFileStore::default_path)
        .unwrap_or_else(|| PathBuf::from("foliochat-state.json"));

    let controller = SessionController::new(
        HttpStreamTransport::new(config.clone()),
        HttpSyncTransport::new(config.clone()),
        JsonFileStore::new(state_path),
    );

    chat::run(&controller, &config).await
}
