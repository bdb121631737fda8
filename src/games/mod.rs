//! Game implementations.

pub mod omok;
