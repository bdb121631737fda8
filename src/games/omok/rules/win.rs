//! Five-in-a-row detection.

use super::super::grid::Grid;
use super::super::types::{Place, Stone};
use strum::IntoEnumIterator;
use tracing::instrument;

/// Number of consecutive stones needed to win.
pub const RUN_LENGTH: usize = 5;

/// Reach of the scan window on either side of the origin.
const REACH: i32 = RUN_LENGTH as i32 - 1;

/// The four axes a run can lie on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumIter)]
pub enum Direction {
    /// Along a row.
    Horizontal,
    /// Along a column.
    Vertical,
    /// Top-left to bottom-right.
    Diagonal,
    /// Top-right to bottom-left.
    AntiDiagonal,
}

impl Direction {
    /// Unit step `(row, col)` for this axis.
    pub fn step(self) -> (i32, i32) {
        match self {
            Direction::Horizontal => (0, 1),
            Direction::Vertical => (1, 0),
            Direction::Diagonal => (1, 1),
            Direction::AntiDiagonal => (1, -1),
        }
    }
}

/// Scans one axis through `origin`, covering offsets -4..=4 as a single run.
///
/// Returns the first five consecutive `stone` cells met along the axis.
fn scan_direction(grid: &Grid, origin: Place, stone: Stone, direction: Direction) -> Option<Vec<Place>> {
    let mut run = Vec::with_capacity(RUN_LENGTH);
    for i in -REACH..=REACH {
        let place = origin.offset(direction.step(), i);
        if grid.occupant(place) == Some(stone) {
            run.push(place);
            if run.len() == RUN_LENGTH {
                return Some(run);
            }
        } else {
            run.clear();
        }
    }
    None
}

/// Checks whether `origin` is part of a five-stone run of `stone`.
///
/// Axes are tried horizontal, vertical, diagonal, anti-diagonal. Returns the
/// winning line in scan order, or `None` when the origin does not hold
/// `stone` or no run of five passes through it.
#[instrument(skip(grid))]
pub fn winning_line_through(grid: &Grid, origin: Place, stone: Stone) -> Option<Vec<Place>> {
    if grid.occupant(origin) != Some(stone) {
        return None;
    }
    Direction::iter().find_map(|direction| scan_direction(grid, origin, stone, direction))
}

/// Finds the first winning line of `stone` on the grid, scanning row-major.
#[instrument(skip(grid))]
pub fn find_winning_line(grid: &Grid, stone: Stone) -> Option<Vec<Place>> {
    grid.occupied()
        .filter(|(_, occupant)| *occupant == stone)
        .find_map(|(place, _)| winning_line_through(grid, place, stone))
}

/// Finds the first winning line of either color, scanning row-major.
#[instrument(skip(grid))]
pub fn find_any_winning_line(grid: &Grid) -> Option<Vec<Place>> {
    grid.occupied()
        .find_map(|(place, occupant)| winning_line_through(grid, place, occupant))
}
