//! Exact negamax solver used as a perfect opponent.
//!
//! Every reachable position is solved once and memoised, so this is only
//! practical for small two-player games such as tic-tac-toe or short Nim
//! piles. Values are utilities for the player to move.

use rand::Rng;
use shuct_core::Game;
use shuct_mcts::Reservoir;
use std::collections::HashMap;
use std::hash::Hash;

/// Memoised negamax over a two-player zero-sum game.
pub struct Minimax<G: Game> {
    memo: HashMap<G::State, f64>,
}

impl<G: Game> Minimax<G>
where
    G::State: Hash + Eq,
{
    /// Create a solver with an empty table.
    pub fn new() -> Self {
        Self {
            memo: HashMap::new(),
        }
    }

    /// True if the game can be solved by negamax.
    pub fn supports(game: &G) -> bool {
        game.num_players() == 2 && !game.is_stochastic() && game.is_alternating()
    }

    /// Number of solved positions.
    pub fn solved(&self) -> usize {
        self.memo.len()
    }

    /// Game-theoretic value of `state` for the player to move.
    pub fn value(&mut self, game: &G, state: &G::State) -> f64 {
        if let Some(&value) = self.memo.get(state) {
            return value;
        }

        let value = if game.is_terminal(state) {
            game.utilities(state).get(game.mover(state))
        } else {
            let moves = game.legal_moves(state);
            if moves.is_empty() {
                0.0
            } else {
                moves
                    .into_iter()
                    .map(|mv| self.move_value(game, state, mv))
                    .fold(f64::NEG_INFINITY, f64::max)
            }
        };

        self.memo.insert(state.clone(), value);
        value
    }

    /// Value of playing `mv` in `state`, for the player to move in `state`.
    pub fn move_value(&mut self, game: &G, state: &G::State, mv: G::Move) -> f64 {
        let mover = game.mover(state);
        let next = game.apply(state, mv);
        let value = self.value(game, &next);
        if game.mover(&next) == mover {
            value
        } else {
            -value
        }
    }

    /// An optimal move, chosen uniformly among equally good ones.
    ///
    /// Returns `None` if the state has no legal moves.
    pub fn best_move<R: Rng>(
        &mut self,
        game: &G,
        state: &G::State,
        rng: &mut R,
    ) -> Option<G::Move> {
        let mut best = Reservoir::new();
        for mv in game.legal_moves(state) {
            let value = self.move_value(game, state, mv);
            best.offer(mv, value, rng);
        }
        best.into_inner()
    }
}

impl<G: Game> Default for Minimax<G>
where
    G::State: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}
