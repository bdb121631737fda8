//! Game rules for omok.
//!
//! Pure functions over a [`Grid`](crate::Grid). Rules are separated
//! from board storage so the board, the reference server and tests can share
//! one scan.

pub mod win;

pub use win::{Direction, RUN_LENGTH, find_any_winning_line, find_winning_line, winning_line_through};
