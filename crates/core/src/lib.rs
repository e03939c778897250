//! Sequential Halving UCT Core - Game contract and common types
//!
//! This crate provides the `Game` trait a rules engine implements so the
//! search core can drive it without knowing anything about its rules.
//!
//! # Types
//!
//! - [`Game`] - Trait for game implementations
//! - [`PlayerId`] - 1-based player index
//! - [`Utilities`] - Per-player outcome values in [-1, 1]

mod error;
mod game;
mod types;

pub use error::{GameError, Result};
pub use game::Game;
pub use types::{PlayerId, Utilities};
