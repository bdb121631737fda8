//! Human player whose moves arrive from the presentation layer.

use super::{Controller, PlayerError, PlayerKind};
use crate::games::omok::{Board, Place};

/// Controller for a human; the session never asks it for a move.
#[derive(Debug, Clone, Copy, Default)]
pub struct HumanController;

#[async_trait::async_trait]
impl Controller for HumanController {
    fn kind(&self) -> PlayerKind {
        PlayerKind::Human
    }

    async fn produce_move(
        &mut self,
        _board: &Board,
        _opponent_last: Option<Place>,
    ) -> Result<Place, PlayerError> {
        Err(PlayerError::NotAutonomous(PlayerKind::Human))
    }
}
