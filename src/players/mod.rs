//! Player identity and the move-production capability.

mod computer;
mod human;
mod remote;

pub use computer::{ComputerOpponent, RandomStrategy, SequentialStrategy, Strategy};
pub use human::HumanController;
pub use remote::RemoteOpponent;

use crate::games::omok::{Board, Place, Seat, Stone};
use crate::remote_client::RemoteError;
use tracing::{debug, instrument};

/// Kind of controller behind a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum PlayerKind {
    /// Moves are pushed in from the presentation layer.
    Human,
    /// Moves come from a local strategy.
    Computer,
    /// Moves come from the remote service.
    Remote,
}

/// Error producing a move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum PlayerError {
    /// This controller only receives moves from outside.
    #[display("{} does not produce moves on its own", _0)]
    NotAutonomous(PlayerKind),

    /// The strategy found no move to play.
    #[display("No move available")]
    NoMove,

    /// The remote service needs our opponent's move before it can answer.
    #[display("Remote opponent cannot move before its opponent")]
    NoOpponentMove,

    /// The remote service failed.
    #[display("{}", _0)]
    Remote(RemoteError),
}

impl std::error::Error for PlayerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlayerError::Remote(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RemoteError> for PlayerError {
    fn from(err: RemoteError) -> Self {
        PlayerError::Remote(err)
    }
}

/// Capability to produce a move for a player.
#[async_trait::async_trait]
pub trait Controller: Send + Sync + std::fmt::Debug {
    /// Which kind of player this is.
    fn kind(&self) -> PlayerKind;

    /// Produces the next move given the board and the opponent's last move.
    async fn produce_move(
        &mut self,
        board: &Board,
        opponent_last: Option<Place>,
    ) -> Result<Place, PlayerError>;

    /// Forgets per-game state when the session is reset.
    fn reset(&mut self) {}
}

/// A seat's occupant: identity plus controller.
#[derive(Debug)]
pub struct Player {
    name: String,
    stone: Stone,
    default_name: String,
    last_move: Option<Place>,
    controller: Box<dyn Controller>,
}

impl Player {
    /// Creates a player; an empty name falls back to `default_name`.
    #[instrument(skip(name, default_name, controller), fields(kind = %controller.kind()))]
    pub fn new(
        name: impl Into<String>,
        default_name: impl Into<String>,
        stone: Stone,
        controller: Box<dyn Controller>,
    ) -> Self {
        let default_name = default_name.into();
        let name = non_empty_or(name.into(), &default_name);
        Self {
            name,
            stone,
            default_name,
            last_move: None,
            controller,
        }
    }

    /// A human player with the seat's default name.
    pub fn human(name: impl Into<String>, seat: Seat, stone: Stone) -> Self {
        Self::new(name, seat.default_name(), stone, Box::new(HumanController))
    }

    /// A computer player driven by `strategy`.
    pub fn computer(name: impl Into<String>, stone: Stone, strategy: Box<dyn Strategy>) -> Self {
        Self::new(
            name,
            "Computer",
            stone,
            Box::new(ComputerOpponent::new(strategy)),
        )
    }

    /// A player backed by the remote service.
    pub fn remote(name: impl Into<String>, stone: Stone, opponent: RemoteOpponent) -> Self {
        Self::new(name, "Remote", stone, Box::new(opponent))
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the player; empty or blank input restores the default name.
    #[instrument(skip(self, name), fields(old = %self.name))]
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = non_empty_or(name.into(), &self.default_name);
        debug!(new = %self.name, "Player renamed");
    }

    /// Stone color for the session.
    pub fn stone(&self) -> Stone {
        self.stone
    }

    /// Controller kind.
    pub fn kind(&self) -> PlayerKind {
        self.controller.kind()
    }

    /// Whether the session should ask this player for moves.
    pub fn is_autonomous(&self) -> bool {
        self.kind() != PlayerKind::Human
    }

    /// This player's last placed move.
    pub fn last_move(&self) -> Option<Place> {
        self.last_move
    }

    /// Records a placed move.
    pub fn record_move(&mut self, place: Place) {
        self.last_move = Some(place);
    }

    /// Asks the controller for a move.
    pub async fn produce_move(
        &mut self,
        board: &Board,
        opponent_last: Option<Place>,
    ) -> Result<Place, PlayerError> {
        self.controller.produce_move(board, opponent_last).await
    }

    /// Clears per-game state; name and stone are kept.
    pub fn reset(&mut self) {
        self.last_move = None;
        self.controller.reset();
    }
}

fn non_empty_or(name: String, default_name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        default_name.to_string()
    } else {
        trimmed.to_string()
    }
}
