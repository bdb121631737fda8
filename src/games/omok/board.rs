//! Omok board: grid storage plus win and draw queries.

use super::grid::{BoardError, DEFAULT_SIZE, Grid};
use super::rules;
use super::types::{Place, Stone};
use tracing::{debug, instrument};

/// A board owning one [`Grid`], a stone counter and the last placement.
///
/// `stones_placed` always equals the number of occupied cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    grid: Grid,
    stones_placed: usize,
    last_move: Option<Place>,
}

impl Board {
    /// Creates an empty board with the given edge length.
    #[instrument]
    pub fn new(size: usize) -> Self {
        Self {
            grid: Grid::new(size),
            stones_placed: 0,
            last_move: None,
        }
    }

    /// Edge length of the board.
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    /// Read access to the underlying grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Places `stone` at `(row, col)`.
    ///
    /// On success the stone counter is incremented and the cell becomes the
    /// last move.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::OutOfBounds`] or [`BoardError::CellOccupied`];
    /// the board is unchanged in either case.
    #[instrument(skip(self), fields(stones_placed = self.stones_placed))]
    pub fn place(&mut self, row: i32, col: i32, stone: Stone) -> Result<Place, BoardError> {
        let place = Place::new(row, col);
        self.grid.place(place, stone)?;
        self.stones_placed += 1;
        self.last_move = Some(place);
        Ok(place)
    }

    /// Returns the stone at `(row, col)`, `None` if empty or off the board.
    pub fn occupant(&self, row: i32, col: i32) -> Option<Stone> {
        self.grid.occupant(Place::new(row, col))
    }

    /// Checks if a cell on the board is empty.
    pub fn is_empty(&self, row: i32, col: i32) -> bool {
        let place = Place::new(row, col);
        self.grid.contains(place) && self.grid.occupant(place).is_none()
    }

    /// Checks if a cell holds a stone.
    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        self.occupant(row, col).is_some()
    }

    /// True iff every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.stones_placed == self.size() * self.size()
    }

    /// True iff the board is full and neither color has five in a row.
    #[instrument(skip(self), fields(stones_placed = self.stones_placed))]
    pub fn is_draw(&self) -> bool {
        self.is_full() && self.winning_line().is_none()
    }

    /// Number of stones on the board.
    pub fn stones_placed(&self) -> usize {
        self.stones_placed
    }

    /// Most recent placement, if any.
    pub fn last_move(&self) -> Option<Place> {
        self.last_move
    }

    /// Checks whether `stone` has five in a row anywhere on the board.
    #[instrument(skip(self))]
    pub fn is_won_by(&self, stone: Stone) -> bool {
        let won = rules::find_winning_line(&self.grid, stone).is_some();
        debug!(%stone, won, "Scanned board for win");
        won
    }

    /// The first five-stone line of either color, for highlighting.
    #[instrument(skip(self))]
    pub fn winning_line(&self) -> Option<Vec<Place>> {
        rules::find_any_winning_line(&self.grid)
    }

    /// Empty cells in row-major order.
    pub fn empty_places(&self) -> impl Iterator<Item = Place> + '_ {
        let size = self.size() as i32;
        (0..size)
            .flat_map(move |row| (0..size).map(move |col| Place::new(row, col)))
            .filter(|p| self.grid.occupant(*p).is_none())
    }

    /// Row-major stone snapshot.
    pub fn stones(&self) -> &[Option<Stone>] {
        self.grid.cells()
    }

    /// Resets every cell, the counter and the last move.
    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        self.grid.clear();
        self.stones_placed = 0;
        self.last_move = None;
    }

    /// Formats the board as a human-readable string.
    ///
    /// Columns are labelled across the top, rows down the left side. The last
    /// move is bracketed.
    pub fn display(&self) -> String {
        let size = self.size() as i32;
        let mut result = String::from("   ");
        for col in 0..size {
            result.push_str(&format!("{:>3}", col));
        }
        result.push('\n');
        for row in 0..size {
            result.push_str(&format!("{:>3}", row));
            for col in 0..size {
                let symbol = self
                    .occupant(row, col)
                    .map(Stone::symbol)
                    .unwrap_or('.');
                if self.last_move == Some(Place::new(row, col)) {
                    result.push_str(&format!("[{}]", symbol));
                } else {
                    result.push_str(&format!("{:>3}", symbol));
                }
            }
            result.push('\n');
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}
