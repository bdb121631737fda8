//! Fixed-size square cell store.

use super::types::{Place, Stone};
use tracing::{debug, instrument, warn};

/// Standard omok board edge length.
pub const DEFAULT_SIZE: usize = 15;

/// Smallest board on which a five-stone run fits.
pub const MIN_SIZE: usize = 5;

/// Largest supported board edge length.
pub const MAX_SIZE: usize = 99;

/// Error returned when a stone cannot be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum BoardError {
    /// Row or column lies outside `[0, size)`.
    #[display("Position {} is outside the {}x{} board", _0, _1, _1)]
    OutOfBounds(Place, usize),

    /// The cell already holds a stone.
    #[display("Position {} is already occupied", _0)]
    CellOccupied(Place),
}

impl std::error::Error for BoardError {}

/// N×N mapping from (row, col) to an optional stone.
///
/// Cells are stored row-major. A written cell is only ever emptied again by
/// [`Grid::clear`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Option<Stone>>,
}

impl Grid {
    /// Creates an empty grid with the given edge length, capped at
    /// [`MAX_SIZE`].
    #[instrument]
    pub fn new(size: usize) -> Self {
        if size > MAX_SIZE {
            warn!(size, max = MAX_SIZE, "Grid size capped");
        }
        let size = size.min(MAX_SIZE);
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    /// Edge length of the grid.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns true if `place` lies on the grid.
    pub fn contains(&self, place: Place) -> bool {
        self.index(place).is_some()
    }

    fn index(&self, place: Place) -> Option<usize> {
        let row = usize::try_from(place.row).ok()?;
        let col = usize::try_from(place.col).ok()?;
        (row < self.size && col < self.size).then_some(row * self.size + col)
    }

    /// Returns the stone at `place`, or `None` if empty or off the grid.
    pub fn occupant(&self, place: Place) -> Option<Stone> {
        self.index(place).and_then(|i| self.cells[i])
    }

    /// Writes `stone` into an empty cell.
    ///
    /// # Errors
    ///
    /// [`BoardError::OutOfBounds`] for coordinates outside the grid,
    /// [`BoardError::CellOccupied`] if the cell already holds a stone. The grid
    /// is unchanged on error.
    #[instrument(skip(self), fields(size = self.size))]
    pub fn place(&mut self, place: Place, stone: Stone) -> Result<(), BoardError> {
        let index = self
            .index(place)
            .ok_or(BoardError::OutOfBounds(place, self.size))?;
        let cell = &mut self.cells[index];
        if cell.is_some() {
            return Err(BoardError::CellOccupied(place));
        }
        *cell = Some(stone);
        debug!(%place, %stone, "Stone written");
        Ok(())
    }

    /// Empties every cell.
    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Row-major view of every cell.
    pub fn cells(&self) -> &[Option<Stone>] {
        &self.cells
    }

    /// Iterates over occupied cells in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (Place, Stone)> + '_ {
        let size = self.size;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|stone| (Place::new((i / size) as i32, (i % size) as i32), stone))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_empty() {
        let grid = Grid::new(DEFAULT_SIZE);
        assert_eq!(grid.cells().len(), 225);
        assert!(grid.cells().iter().all(Option::is_none));
        assert_eq!(grid.occupied().count(), 0);
    }

    #[test]
    fn test_place_and_read_back() {
        let mut grid = Grid::new(DEFAULT_SIZE);
        grid.place(Place::new(3, 4), Stone::White).unwrap();
        assert_eq!(grid.occupant(Place::new(3, 4)), Some(Stone::White));
        assert_eq!(grid.occupant(Place::new(4, 3)), None);
    }

    #[test]
    fn test_place_occupied_fails() {
        let mut grid = Grid::new(DEFAULT_SIZE);
        grid.place(Place::new(0, 0), Stone::Black).unwrap();
        let err = grid.place(Place::new(0, 0), Stone::White).unwrap_err();
        assert_eq!(err, BoardError::CellOccupied(Place::new(0, 0)));
        assert_eq!(grid.occupant(Place::new(0, 0)), Some(Stone::Black));
    }

    #[test]
    fn test_place_out_of_bounds() {
        let mut grid = Grid::new(DEFAULT_SIZE);
        for place in [
            Place::new(-1, 0),
            Place::new(0, -1),
            Place::new(15, 0),
            Place::new(0, 15),
        ] {
            assert_eq!(
                grid.place(place, Stone::Black),
                Err(BoardError::OutOfBounds(place, 15))
            );
        }
        assert_eq!(grid.occupied().count(), 0);
    }

    #[test]
    fn test_occupied_is_row_major() {
        let mut grid = Grid::new(5);
        grid.place(Place::new(2, 1), Stone::Black).unwrap();
        grid.place(Place::new(0, 4), Stone::White).unwrap();
        let seen: Vec<_> = grid.occupied().collect();
        assert_eq!(
            seen,
            vec![
                (Place::new(0, 4), Stone::White),
                (Place::new(2, 1), Stone::Black)
            ]
        );
    }

    #[test]
    fn test_oversized_grid_is_capped() {
        let grid = Grid::new(5_000_000_000);
        assert_eq!(grid.size(), MAX_SIZE);
        assert_eq!(grid.cells().len(), MAX_SIZE * MAX_SIZE);
        assert!(grid.contains(Place::new(98, 98)));
        assert!(!grid.contains(Place::new(99, 0)));
    }

    #[test]
    fn test_clear() {
        let mut grid = Grid::new(5);
        grid.place(Place::new(1, 1), Stone::Black).unwrap();
        grid.clear();
        assert_eq!(grid.occupant(Place::new(1, 1)), None);
    }
}
