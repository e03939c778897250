//! The search agent.
//!
//! `SequentialHalvingUct` is the entry point callers hold on to between
//! moves. Each call builds its own tree, runs a halving session over it and
//! throws the tree away; only the config, the RNG and the player identity
//! survive across calls.

use crate::budget::{Budget, HalvingSchedule, StopReason};
use crate::config::{SearchConfig, SearchLimits};
use crate::error::SearchError;
use crate::halving::Session;
use log::debug;
use rand::Rng;
use shuct_core::{Game, PlayerId};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Statistics for one surviving root move.
#[derive(Clone, Debug, PartialEq)]
pub struct ArmSummary<M> {
    /// The root move.
    pub mv: M,

    /// Search steps that went through this arm.
    pub visits: u32,

    /// Mean utility for the player to move at the root.
    pub value: f64,
}

/// Result of a search call.
#[derive(Clone, Debug)]
pub struct SearchResult<M> {
    /// Robust-child move.
    pub best_move: M,

    /// Surviving arms, in root child order.
    pub arms: Vec<ArmSummary<M>>,

    /// Search steps run, bootstrap included.
    pub iterations: usize,

    /// Halving rounds completed.
    pub rounds_completed: usize,

    /// Schedule derived for this call.
    pub schedule: HalvingSchedule,

    /// Why the search stopped.
    pub stop: StopReason,

    /// Wall-clock time spent.
    pub elapsed: Duration,
}

impl<M: Copy> SearchResult<M> {
    /// Get the best move.
    pub fn best(&self) -> M {
        self.best_move
    }
}

/// Sequential Halving applied to UCT.
///
/// Generic over the random number generator so tests can inject a seeded
/// one. The same agent can search any game that passes `supports_game`.
pub struct SequentialHalvingUct<R: Rng> {
    config: SearchConfig,
    rng: R,
    player: Option<PlayerId>,
    interrupt: Arc<AtomicBool>,
}

impl<R: Rng> SequentialHalvingUct<R> {
    /// Create an agent with the given config and random source.
    pub fn new(config: SearchConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            player: None,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Display name of the algorithm.
    pub fn name(&self) -> &'static str {
        "SH-UCT"
    }

    /// Agent configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Player recorded by `init_ai`, if any.
    pub fn player(&self) -> Option<PlayerId> {
        self.player
    }

    /// Handle to the interrupt flag.
    ///
    /// Storing `true` from any thread stops the running call at its next
    /// step; the call still returns a move if at least one arm exists.
    /// The agent never lowers the flag itself. While it stays raised every
    /// call stops before sampling anything and fails with `EmptyRoot`.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// True if the game is deterministic and strictly alternating.
    pub fn supports_game<G: Game>(&self, game: &G) -> bool {
        !game.is_stochastic() && game.is_alternating()
    }

    /// Record which player this agent plays for.
    pub fn init_ai<G: Game>(&mut self, _game: &G, player: PlayerId) {
        self.player = Some(player);
    }

    /// Pick a move for the player to move in `state`.
    ///
    /// `max_seconds <= 0` means no time limit and `max_iterations < 0` means
    /// no iteration limit. `max_depth` is accepted and ignored.
    pub fn select_action<G: Game>(
        &mut self,
        game: &G,
        state: &G::State,
        max_seconds: f64,
        max_iterations: i64,
        max_depth: i64,
    ) -> Result<G::Move, SearchError> {
        let limits = SearchLimits {
            max_seconds,
            max_iterations,
            max_depth,
        };
        self.search(game, state, limits).map(|result| result.best_move)
    }

    /// Run a full search from `state` and report its statistics.
    ///
    /// # Errors
    /// - `UnsupportedGame` if the game fails `supports_game`
    /// - `TerminalState` if the game is already over
    /// - `NoLegalMoves` if the mover has nothing to play
    /// - `EmptyRoot` if the call was interrupted before any arm was sampled
    pub fn search<G: Game>(
        &mut self,
        game: &G,
        state: &G::State,
        limits: SearchLimits,
    ) -> Result<SearchResult<G::Move>, SearchError> {
        if !self.supports_game(game) {
            return Err(SearchError::UnsupportedGame);
        }
        if game.is_terminal(state) {
            return Err(SearchError::TerminalState);
        }
        let num_moves = game.legal_moves(state).len();
        if num_moves == 0 {
            return Err(SearchError::NoLegalMoves);
        }

        let start = Instant::now();
        let budget = Budget::start(&limits, Arc::clone(&self.interrupt));
        let schedule = HalvingSchedule::from_budget(self.config.schedule_budget(&limits));
        debug!(
            "Search started: {} arms, {} rounds of {} iterations per arm",
            num_moves, schedule.rounds, schedule.iterations_per_round
        );

        let mut session = Session::new(
            game,
            state.clone(),
            schedule,
            budget,
            self.config.exploration,
            &mut self.rng,
        );
        let stop = session.run();
        let best_move = session.best_move()?;

        let tree = session.tree();
        let root = tree.root();
        let mover = game.mover(&tree.get(root).state);
        let arms = tree
            .children(root)
            .iter()
            .filter_map(|&id| {
                let node = tree.get(id);
                node.mv.map(|mv| ArmSummary {
                    mv,
                    visits: node.stats.visit_count,
                    value: node.stats.mean(mover),
                })
            })
            .collect();

        Ok(SearchResult {
            best_move,
            arms,
            iterations: session.iterations(),
            rounds_completed: session.rounds_completed(),
            schedule,
            stop,
            elapsed: start.elapsed(),
        })
    }
}
