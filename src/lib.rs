//! Omok - five-in-a-row game engine
//!
//! Board model, win/draw detection and a turn-based session that sequences
//! moves between local humans, a local computer strategy and a remote
//! opponent reached over HTTP.
//!
//! # Architecture
//!
//! - **Board**: [`Grid`] storage plus win and draw queries ([`rules`])
//! - **Players**: identity plus a [`Controller`] (human, computer, remote)
//! - **Remote**: [`RemoteClient`] for the `new/` + `play/` protocol, and a
//!   reference [`server`] speaking the same protocol
//! - **Session**: [`GameSession`] state machine emitting [`GameEvent`]s
//!
//! # Example
//!
//! ```no_run
//! use omok::{GameMode, GameSession, OmokConfig, PlayerNames, SessionState};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = OmokConfig::default();
//! let names = PlayerNames::new("Ann".to_string(), String::new());
//! let mut session = GameSession::start(GameMode::HumanVsComputer, &names, &config).await?;
//!
//! let state = session.submit_move(7, 7).await?;
//! assert!(matches!(state, SessionState::AwaitingMove(_)));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod games;
mod mode;
mod players;
mod remote_client;
mod session;

pub mod server;

// Crate-level exports - Configuration
pub use config::{ConfigError, OmokConfig, REMOTE_URL_ENV, RemoteConfig};

// Crate-level exports - Board and rules
pub use games::omok::{
    Board, BoardError, DEFAULT_SIZE, Grid, MAX_SIZE, MIN_SIZE, Place, Seat, Stone, rules,
};

// Crate-level exports - Players
pub use players::{
    ComputerOpponent, Controller, HumanController, Player, PlayerError, PlayerKind,
    RandomStrategy, RemoteOpponent, SequentialStrategy, Strategy,
};

// Crate-level exports - Remote protocol
pub use remote_client::{
    NewGameResponse, PlayResponse, RemoteClient, RemoteError, WireMove, parse_new_game, parse_play,
};

// Crate-level exports - Session management
pub use mode::{GameMode, PlayerNames};
pub use session::{GameEvent, GameSession, SessionError, SessionState};
