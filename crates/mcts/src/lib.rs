//! Sequential Halving applied to UCT.
//!
//! This crate provides a decision-time tree search for deterministic,
//! alternating-move games implementing the `shuct_core::Game` trait.
//!
//! # Features
//!
//! - **Generic**: Works with any `Game` implementation and any number of players
//! - **UCB1 Selection**: Below the root, children are ranked with UCB1 and
//!   ties are broken uniformly at random
//! - **Sequential Halving**: At the root, surviving moves get equal budgets
//!   per round and the weaker half is discarded until one remains
//! - **Robust Child**: The returned move is the most-visited survivor
//! - **Cooperative Limits**: Time, iteration and interrupt limits stop the
//!   search between steps; a best-effort move is still returned
//!
//! # Example
//!
//! ```
//! use shuct_mcts::{SearchConfig, SearchLimits, SequentialHalvingUct, games::TicTacToe};
//! use shuct_core::Game;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let game = TicTacToe;
//! let state = game.initial_state();
//!
//! let rng = ChaCha8Rng::seed_from_u64(42);
//! let mut agent = SequentialHalvingUct::new(SearchConfig::default(), rng);
//!
//! let result = agent.search(&game, &state, SearchLimits::iterations(500)).unwrap();
//! println!("Best move: {}", result.best_move);
//! println!("Stopped: {:?} after {} iterations", result.stop, result.iterations);
//! ```

mod backprop;
pub mod budget;
pub mod config;
pub mod error;
pub mod games;
pub mod halving;
mod node;
mod rollout;
pub mod search;
pub mod selection;
mod tree;

pub use budget::{Budget, HalvingSchedule, StopReason};
pub use config::{SearchConfig, SearchLimits};
pub use error::SearchError;
pub use halving::{discard_indices, Phase, Session};
pub use node::{Node, NodeId, NodeStats};
pub use search::{ArmSummary, SearchResult, SequentialHalvingUct};
pub use selection::Reservoir;
pub use tree::Tree;
