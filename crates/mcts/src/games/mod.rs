//! Reference game implementations for search validation.
//!
//! Both games are small enough to solve exactly, which makes them useful
//! for checking that the search converges on the right move.

pub mod nim;
pub mod tictactoe;

pub use nim::{Nim, NimMove, NimState};
pub use tictactoe::{Mark, TicTacToe, TicTacToeMove, TicTacToeState};
