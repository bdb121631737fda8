mod board;
mod grid;
pub mod rules;
mod types;

pub use board::Board;
pub use grid::{BoardError, DEFAULT_SIZE, Grid, MAX_SIZE, MIN_SIZE};
pub use types::{Place, Seat, Stone};
