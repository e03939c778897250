//! Playout bridge between the tree and the game's default policy.
//!
//! Holds no state and never touches the tree: it only turns a node's state
//! into a utility vector.

use rand::Rng;
use shuct_core::{Game, Utilities};

/// Utilities for `state`, playing it out first if the game is not over.
///
/// The playout runs on a private copy; `state` is left untouched.
pub fn complete<G: Game, R: Rng>(game: &G, state: &G::State, rng: &mut R) -> Utilities {
    if game.is_terminal(state) {
        return game.utilities(state);
    }
    let terminal = game.playout(state.clone(), rng);
    game.utilities(&terminal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{Nim, NimMove, TicTacToe, TicTacToeMove};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use shuct_core::PlayerId;

    #[test]
    fn test_terminal_state_skips_playout() {
        let game = Nim::new(2, 3);
        let state = game.apply(&game.initial_state(), NimMove(2));
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let u = complete(&game, &state, &mut rng);
        assert_eq!(u.get(PlayerId::FIRST), 1.0);
    }

    #[test]
    fn test_forced_playout() {
        // One object left after P1 takes one: P2 must take the last
        let game = Nim::new(2, 1);
        let state = game.apply(&game.initial_state(), NimMove(1));
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let u = complete(&game, &state, &mut rng);
        assert_eq!(u.get(PlayerId::FIRST), -1.0);
        assert_eq!(state.remaining(), 1);
    }

    #[test]
    fn test_utilities_in_range() {
        let game = TicTacToe;
        let state = game.apply(&game.initial_state(), TicTacToeMove(4));
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..200 {
            let u = complete(&game, &state, &mut rng);
            assert_eq!(u.num_players(), 2);
            for (_, value) in u.iter() {
                assert!((-1.0..=1.0).contains(&value));
            }
        }
    }
}
