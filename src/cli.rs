//! Command-line interface for omok.

use clap::{Parser, Subcommand};
use omok::GameMode;

/// Omok - five in a row against a friend, the computer or a remote service
#[derive(Parser, Debug)]
#[command(name = "omok")]
#[command(about = "Five-in-a-row game engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a game in the terminal
    Play {
        /// Who sits in the second seat
        #[arg(short, long, default_value_t = GameMode::HumanVsComputer)]
        mode: GameMode,

        /// Name for player 1
        #[arg(long, default_value = "")]
        name1: String,

        /// Name for player 2
        #[arg(long, default_value = "")]
        name2: String,

        /// Strategy requested from the remote service
        #[arg(long)]
        strategy: Option<String>,

        /// Remote service base URL (overrides config and OMOK_REMOTE_URL)
        #[arg(long)]
        server_url: Option<String>,

        /// Path to config file
        #[arg(short, long, default_value = "omok.toml")]
        config: std::path::PathBuf,
    },

    /// Run the reference remote service
    Serve {
        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Board edge length for hosted games
        #[arg(long, default_value_t = omok::DEFAULT_SIZE)]
        board_size: usize,
    },
}
