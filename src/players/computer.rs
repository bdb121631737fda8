//! Local computer opponent driven by a pluggable strategy.

use super::{Controller, PlayerError, PlayerKind};
use crate::games::omok::{Board, Place};
use rand::seq::IteratorRandom;
use tracing::{debug, instrument};

/// Move selection for a computer player.
pub trait Strategy: Send + Sync + std::fmt::Debug {
    /// Strategy name for logs and the reference server.
    fn name(&self) -> &str;

    /// Picks an empty cell, or `None` if there is nothing to play.
    fn best_move(&self, board: &Board) -> Option<Place>;
}

/// Picks the first empty cell in row-major order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialStrategy;

impl Strategy for SequentialStrategy {
    fn name(&self) -> &str {
        "Sequential"
    }

    fn best_move(&self, board: &Board) -> Option<Place> {
        board.empty_places().next()
    }
}

/// Picks a uniformly random empty cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomStrategy;

impl Strategy for RandomStrategy {
    fn name(&self) -> &str {
        "Random"
    }

    fn best_move(&self, board: &Board) -> Option<Place> {
        board.empty_places().choose(&mut rand::thread_rng())
    }
}

/// Controller asking a [`Strategy`] for each move.
#[derive(Debug)]
pub struct ComputerOpponent {
    strategy: Box<dyn Strategy>,
}

impl ComputerOpponent {
    /// Creates a computer opponent.
    pub fn new(strategy: Box<dyn Strategy>) -> Self {
        Self { strategy }
    }
}

#[async_trait::async_trait]
impl Controller for ComputerOpponent {
    fn kind(&self) -> PlayerKind {
        PlayerKind::Computer
    }

    #[instrument(skip(self, board, _opponent_last), fields(strategy = self.strategy.name()))]
    async fn produce_move(
        &mut self,
        board: &Board,
        _opponent_last: Option<Place>,
    ) -> Result<Place, PlayerError> {
        let place = self.strategy.best_move(board).ok_or(PlayerError::NoMove)?;
        debug!(%place, "Computer chose move");
        Ok(place)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::omok::Stone;

    #[test]
    fn test_sequential_takes_first_empty() {
        let mut board = Board::new(5);
        board.place(0, 0, Stone::Black).unwrap();
        board.place(0, 1, Stone::White).unwrap();
        assert_eq!(SequentialStrategy.best_move(&board), Some(Place::new(0, 2)));
    }

    #[test]
    fn test_random_only_picks_empty_cells() {
        let mut board = Board::new(5);
        for col in 0..5 {
            board.place(0, col, Stone::Black).unwrap();
        }
        for _ in 0..50 {
            let place = RandomStrategy.best_move(&board).unwrap();
            assert!(board.is_empty(place.row, place.col));
        }
    }

    #[test]
    fn test_full_board_has_no_move() {
        let mut board = Board::new(5);
        for row in 0..5 {
            for col in 0..5 {
                board.place(row, col, Stone::Black).unwrap();
            }
        }
        assert_eq!(SequentialStrategy.best_move(&board), None);
        assert_eq!(RandomStrategy.best_move(&board), None);
    }

    #[tokio::test]
    async fn test_opponent_reports_no_move() {
        let mut board = Board::new(5);
        for row in 0..5 {
            for col in 0..5 {
                board.place(row, col, Stone::White).unwrap();
            }
        }
        let mut opponent = ComputerOpponent::new(Box::new(SequentialStrategy));
        assert_eq!(
            opponent.produce_move(&board, None).await,
            Err(PlayerError::NoMove)
        );
    }
}
