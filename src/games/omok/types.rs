//! Core domain types for omok.

use derive_new::new;
use serde::{Deserialize, Serialize};

/// Stone color placed by a player.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Stone {
    /// Black stone (moves first by convention).
    Black,
    /// White stone.
    White,
}

impl Stone {
    /// Returns the other stone color.
    pub fn opponent(self) -> Self {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
        }
    }

    /// Single-character symbol used in text boards.
    pub fn symbol(self) -> char {
        match self {
            Stone::Black => 'X',
            Stone::White => 'O',
        }
    }
}

/// An immutable (row, col) cell coordinate.
///
/// Coordinates are signed so that off-board values coming from user input or
/// the wire can be represented and rejected by the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct Place {
    /// Row index, 0-based from the top.
    pub row: i32,
    /// Column index, 0-based from the left.
    pub col: i32,
}

impl Place {
    /// Returns the place `steps` cells away along `(dr, dc)`.
    pub fn offset(self, (dr, dc): (i32, i32), steps: i32) -> Self {
        Self {
            row: self.row + dr * steps,
            col: self.col + dc * steps,
        }
    }
}

impl std::fmt::Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Which of the two player slots in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Seat {
    /// Player 1, always moves first after a reset.
    First,
    /// Player 2.
    Second,
}

impl Seat {
    /// Returns the other seat.
    pub fn other(self) -> Self {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }

    /// Array index for this seat.
    pub fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }

    /// Default display name for a human sitting here.
    pub fn default_name(self) -> &'static str {
        match self {
            Seat::First => "Player 1",
            Seat::Second => "Player 2",
        }
    }
}
