use crate::{PlayerId, Utilities};
use rand::Rng;
use std::fmt::Debug;
use std::hash::Hash;

/// A game abstraction for decision-time tree search.
///
/// This trait is the whole surface the search core sees of a rules engine.
/// It covers deterministic, perfect-information games with any number of
/// players; players are numbered from 1.
pub trait Game: Clone + Send + Sync {
    /// The game state (e.g., a board position)
    type State: Clone + Send;

    /// A game move
    type Move: Clone + Copy + Send + Eq + Hash + Debug;

    /// Returns the initial game state
    fn initial_state(&self) -> Self::State;

    /// Number of players taking part in the game
    fn num_players(&self) -> usize;

    /// The player whose turn it is in `state`
    fn mover(&self, state: &Self::State) -> PlayerId;

    /// Returns all legal moves from the given state.
    ///
    /// The order must be stable and free of duplicates for a given state.
    fn legal_moves(&self, state: &Self::State) -> Vec<Self::Move>;

    /// Applies a move, returning a new state (immutable operation)
    fn apply(&self, state: &Self::State, mv: Self::Move) -> Self::State;

    /// Returns true if the game has ended
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Utilities of every player for a terminal state
    fn utilities(&self, state: &Self::State) -> Utilities;

    /// Plays the game out from `state` to a terminal state.
    ///
    /// The default policy picks uniformly random legal moves. Engines with a
    /// stronger default policy should override this.
    fn playout<R: Rng>(&self, state: Self::State, rng: &mut R) -> Self::State {
        let mut state = state;
        while !self.is_terminal(&state) {
            let moves = self.legal_moves(&state);
            if moves.is_empty() {
                break;
            }
            let mv = moves[rng.gen_range(0..moves.len())];
            state = self.apply(&state, mv);
        }
        state
    }

    /// True if the game contains chance events
    fn is_stochastic(&self) -> bool {
        false
    }

    /// True if exactly one player moves at a time
    fn is_alternating(&self) -> bool {
        true
    }
}
