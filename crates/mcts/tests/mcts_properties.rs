//! Property-based tests for the Sequential Halving search.
//!
//! These tests drive `Session` tick by tick and check the structural
//! guarantees of the search:
//! - bootstrap gives every legal root move exactly one sampled child
//! - each completed round leaves `max(1, ceil(M / 2^k))` arms
//! - visit counts match the number of steps through each node
//! - the returned move is always a surviving arm
//! - same seed, same result

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use shuct_core::Game;
use shuct_mcts::games::{Nim, TicTacToe};
use shuct_mcts::{
    Budget, HalvingSchedule, Phase, SearchConfig, SearchLimits, SequentialHalvingUct, Session,
    Tree,
};
use std::collections::HashSet;

// =============================================================================
// Strategies for generating test inputs
// =============================================================================

/// Generate a random seed
fn arb_seed() -> impl Strategy<Value = u64> {
    any::<u64>()
}

/// Generate a schedule budget (small enough for fast tests)
fn arb_budget() -> impl Strategy<Value = usize> {
    1usize..300
}

/// Generate a random non-terminal tic-tac-toe position
fn arb_tictactoe_position() -> impl Strategy<Value = <TicTacToe as Game>::State> {
    (0usize..8, arb_seed()).prop_map(|(num_moves, seed)| {
        let game = TicTacToe;
        let mut state = game.initial_state();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        for _ in 0..num_moves {
            let moves = game.legal_moves(&state);
            let mv = moves[rand::Rng::gen_range(&mut rng, 0..moves.len())];
            let next = game.apply(&state, mv);
            if game.is_terminal(&next) {
                break;
            }
            state = next;
        }
        state
    })
}

fn expected_survivors(arms: usize, rounds: usize) -> usize {
    let mut left = arms;
    for _ in 0..rounds {
        left = left.div_ceil(2);
    }
    left.max(1)
}

/// Every non-root, non-terminal node was created by one step and passed on
/// every later step to exactly one child.
fn check_visit_counts<G: Game>(tree: &Tree<G>, iterations: usize) -> Result<(), TestCaseError> {
    let root = tree.root();
    prop_assert_eq!(tree.get(root).stats.visit_count as usize, iterations);

    for id in tree.node_ids() {
        let node = tree.get(id);
        let child_visits: u32 = node
            .children
            .iter()
            .map(|&child| tree.get(child).stats.visit_count)
            .sum();

        if id == root {
            prop_assert!(child_visits <= node.stats.visit_count);
        } else if node.terminal {
            prop_assert!(node.children.is_empty());
            prop_assert!(node.stats.visit_count >= 1);
        } else {
            prop_assert_eq!(node.stats.visit_count, 1 + child_visits);
        }
    }
    Ok(())
}

// =============================================================================
// Bootstrap
// =============================================================================

proptest! {
    /// After bootstrap the root has one child per legal move, each visited once
    #[test]
    fn prop_bootstrap_covers_every_move(
        seed in arb_seed(),
        state in arb_tictactoe_position()
    ) {
        let game = TicTacToe;
        let legal: HashSet<_> = game.legal_moves(&state).into_iter().collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut session = Session::new(
            &game,
            state,
            HalvingSchedule::from_budget(100),
            Budget::unlimited(),
            2.0,
            &mut rng,
        );

        while session.phase() == Phase::Bootstrap {
            prop_assert_eq!(session.tick(), None);
        }

        let tree = session.tree();
        let root = tree.root();
        prop_assert_eq!(tree.children(root).len(), legal.len());
        prop_assert_eq!(session.iterations(), legal.len());

        let mut seen = HashSet::new();
        for &child in tree.children(root) {
            let node = tree.get(child);
            prop_assert_eq!(node.stats.visit_count, 1);
            let mv = node.mv.unwrap();
            prop_assert!(legal.contains(&mv));
            prop_assert!(seen.insert(mv), "duplicate root move {:?}", mv);
        }
    }
}

// =============================================================================
// Halving
// =============================================================================

proptest! {
    /// Survivor count follows max(1, ceil(M / 2^k)) throughout the search
    #[test]
    fn prop_survivors_halve_each_round(
        seed in arb_seed(),
        budget in arb_budget(),
        state in arb_tictactoe_position()
    ) {
        let game = TicTacToe;
        let arms = game.legal_moves(&state).len();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut session = Session::new(
            &game,
            state,
            HalvingSchedule::from_budget(budget),
            Budget::unlimited(),
            2.0,
            &mut rng,
        );

        loop {
            let stop = session.tick();
            if session.phase() != Phase::Bootstrap {
                prop_assert_eq!(
                    session.survivors(),
                    expected_survivors(arms, session.rounds_completed())
                );
            }
            if stop.is_some() {
                break;
            }
        }
        prop_assert_eq!(session.survivors(), 1);
    }

    /// Visit counts equal the number of steps that went through each node
    #[test]
    fn prop_visit_counts_match_steps(
        seed in arb_seed(),
        budget in arb_budget(),
        cap in 1usize..400,
        state in arb_tictactoe_position()
    ) {
        let game = TicTacToe;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let limits = SearchLimits::iterations(cap);
        let mut session = Session::new(
            &game,
            state,
            HalvingSchedule::from_budget(budget),
            Budget::start(&limits, Default::default()),
            2.0,
            &mut rng,
        );

        session.run();
        check_visit_counts(session.tree(), session.iterations())?;
    }
}

// =============================================================================
// Agent results
// =============================================================================

proptest! {
    /// The chosen move is a surviving arm and arm values stay in range
    #[test]
    fn prop_best_move_survives(
        seed in arb_seed(),
        cap in 1i64..400,
        state in arb_tictactoe_position()
    ) {
        let game = TicTacToe;
        let mut agent = SequentialHalvingUct::new(
            SearchConfig::default(),
            ChaCha8Rng::seed_from_u64(seed),
        );
        let limits = SearchLimits { max_iterations: cap, ..SearchLimits::unlimited() };

        let result = agent.search(&game, &state, limits).unwrap();

        prop_assert!(result.arms.iter().any(|arm| arm.mv == result.best_move));
        let most_visits = result.arms.iter().map(|arm| arm.visits).max().unwrap();
        let best_visits = result
            .arms
            .iter()
            .find(|arm| arm.mv == result.best_move)
            .map(|arm| arm.visits);
        prop_assert_eq!(best_visits, Some(most_visits));
        for arm in &result.arms {
            prop_assert!((-1.0..=1.0).contains(&arm.value));
        }
    }

    /// Same seed should produce identical results
    #[test]
    fn prop_deterministic(
        seed in arb_seed(),
        budget in arb_budget(),
        state in arb_tictactoe_position()
    ) {
        let game = TicTacToe;

        let run = || {
            let mut agent = SequentialHalvingUct::new(
                SearchConfig::with_fallback_budget(budget),
                ChaCha8Rng::seed_from_u64(seed),
            );
            agent.search(&game, &state, SearchLimits::unlimited()).unwrap()
        };

        let first = run();
        let second = run();
        prop_assert_eq!(first.best_move, second.best_move);
        prop_assert_eq!(first.arms, second.arms);
        prop_assert_eq!(first.iterations, second.iterations);
        prop_assert_eq!(first.rounds_completed, second.rounds_completed);
    }
}

// =============================================================================
// Utilities
// =============================================================================

proptest! {
    /// Playouts of any Nim variant end with utilities in [-1, 1]
    #[test]
    fn prop_nim_utilities_in_range(
        seed in arb_seed(),
        pile in 1u32..40,
        max_take in 1u32..6,
        players in 1usize..6
    ) {
        let game = Nim::with_players(pile, max_take, players);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let terminal = game.playout(game.initial_state(), &mut rng);
        prop_assert!(game.is_terminal(&terminal));

        let utilities = game.utilities(&terminal);
        prop_assert_eq!(utilities.num_players(), players);
        for (_, value) in utilities.iter() {
            prop_assert!((-1.0..=1.0).contains(&value));
        }
    }
}
