//! Omok - unified CLI
//!
//! Terminal play against a friend, the computer or a remote service, plus
//! the reference remote service itself.

#![warn(missing_docs)]

mod cli;
mod console;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use omok::{GameMode, GameSession, OmokConfig, PlayerNames, server};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr so the board on stdout stays readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            mode,
            name1,
            name2,
            strategy,
            server_url,
            config,
        } => run_play(mode, PlayerNames::new(name1, name2), strategy, server_url, config).await,
        Command::Serve {
            port,
            host,
            board_size,
        } => run_server(host, port, board_size).await,
    }
}

/// Play a game in the terminal
#[instrument(skip_all, fields(mode = %mode, config_path = %config_path.display()))]
async fn run_play(
    mode: GameMode,
    names: PlayerNames,
    strategy: Option<String>,
    server_url: Option<String>,
    config_path: std::path::PathBuf,
) -> Result<()> {
    let mut config = OmokConfig::load_or_default(&config_path)?.apply_env();
    let mut remote = config.remote().clone();
    if let Some(url) = server_url {
        remote = remote.with_base_url(url);
    }
    if let Some(strategy) = strategy {
        remote = remote.with_strategy(strategy);
    }
    config = config.with_remote(remote);

    info!(mode = mode.label(), "Starting game");
    let session = GameSession::start(mode, &names, &config)
        .await
        .context("Failed to start game")?;
    console::run(session).await
}

/// Run the reference remote service
async fn run_server(host: String, port: u16, board_size: usize) -> Result<()> {
    anyhow::ensure!(
        (omok::MIN_SIZE..=omok::MAX_SIZE).contains(&board_size),
        "board size must be between {} and {}",
        omok::MIN_SIZE,
        omok::MAX_SIZE
    );
    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;
    info!("Server ready at http://{}:{}/", host, port);
    server::serve(listener, server::ServerState::new(board_size)).await?;
    Ok(())
}
