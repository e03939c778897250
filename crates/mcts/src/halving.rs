//! Sequential Halving over the root's children.
//!
//! A search call is one `Session`: an explicit state machine that first
//! bootstraps one child per legal root move, then alternates between giving
//! every surviving arm the same number of search steps and discarding the
//! weaker half. Each `tick` does at most one search step, so the external
//! budget is polled between every pair of steps. Only round steps count
//! toward the iteration cap; bootstrap steps are free.

use crate::backprop::backpropagate;
use crate::budget::{Budget, HalvingSchedule, StopReason};
use crate::error::SearchError;
use crate::node::NodeId;
use crate::rollout;
use crate::selection::{finalize, select};
use crate::tree::Tree;
use log::{debug, trace};
use rand::Rng;
use shuct_core::Game;

/// Where a session is in its control loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Expanding the root until every legal move has a sampled child.
    Bootstrap,

    /// Running steps for the root child at index `child`; `done` steps of
    /// the current round have been spent on it so far.
    RoundAllocation { child: usize, done: usize },

    /// Every survivor got its share; rank and discard.
    RoundRanking,
}

/// Indices to discard when halving arms with the given values.
///
/// Arms are ranked by value, descending, ties broken by index, descending.
/// The top `ceil(n / 2)` survive. The discarded indices come back in
/// descending order, ready for positional removal.
pub fn discard_indices(values: &[f64]) -> Vec<usize> {
    let mut ranked: Vec<usize> = (0..values.len()).collect();
    ranked.sort_by(|&a, &b| values[b].total_cmp(&values[a]).then(b.cmp(&a)));

    let keep = values.len().div_ceil(2);
    let mut discarded = ranked.split_off(keep);
    discarded.sort_unstable_by(|a, b| b.cmp(a));
    discarded
}

/// State of one search call.
pub struct Session<'a, G: Game, R: Rng> {
    game: &'a G,
    tree: Tree<G>,
    schedule: HalvingSchedule,
    budget: Budget,
    exploration: f64,
    rng: &'a mut R,
    phase: Phase,
    iterations: usize,
    round_steps: usize,
    rounds_completed: usize,
}

impl<'a, G: Game, R: Rng> Session<'a, G, R> {
    /// Start a session with a fresh tree rooted at `state`.
    pub fn new(
        game: &'a G,
        state: G::State,
        schedule: HalvingSchedule,
        budget: Budget,
        exploration: f64,
        rng: &'a mut R,
    ) -> Self {
        Self {
            game,
            tree: Tree::new(game, state),
            schedule,
            budget,
            exploration,
            rng,
            phase: Phase::Bootstrap,
            iterations: 0,
            round_steps: 0,
            rounds_completed: 0,
        }
    }

    /// Tick until the session stops.
    pub fn run(&mut self) -> StopReason {
        loop {
            if let Some(reason) = self.tick() {
                debug!(
                    "Search stopped ({:?}) after {} iterations, {} rounds, {} arms left",
                    reason,
                    self.iterations,
                    self.rounds_completed,
                    self.survivors()
                );
                return reason;
            }
        }
    }

    /// Advance the state machine by at most one search step.
    ///
    /// Returns the reason the session stopped, or `None` if it can continue.
    pub fn tick(&mut self) -> Option<StopReason> {
        match self.phase {
            Phase::Bootstrap => {
                if self.budget.is_interrupted() {
                    return Some(StopReason::Interrupted);
                }
                let root = self.tree.root();
                if !self.tree.get(root).is_fully_expanded() {
                    let leaf = self.search_step(root);
                    trace!("Bootstrapped root arm {:?}", self.tree.get(leaf).mv);
                }
                if self.tree.get(root).is_fully_expanded() {
                    debug!("Bootstrap done: {} arms", self.survivors());
                    self.phase = Phase::RoundAllocation { child: 0, done: 0 };
                }
                None
            }
            Phase::RoundAllocation { child, done } => {
                let survivors = self.survivors();
                if child == 0 && done == 0 && survivors <= 1 {
                    return Some(StopReason::SingleSurvivor);
                }
                if let Some(reason) = self.budget.exhausted(self.round_steps) {
                    return Some(reason);
                }

                let arm = self.tree.children(self.tree.root())[child];
                self.search_step(arm);
                self.round_steps += 1;

                self.phase = if done + 1 < self.schedule.iterations_per_round {
                    Phase::RoundAllocation {
                        child,
                        done: done + 1,
                    }
                } else if child + 1 < survivors {
                    Phase::RoundAllocation {
                        child: child + 1,
                        done: 0,
                    }
                } else {
                    Phase::RoundRanking
                };
                None
            }
            Phase::RoundRanking => {
                self.halve();
                self.phase = Phase::RoundAllocation { child: 0, done: 0 };
                None
            }
        }
    }

    /// Rank the root's children for the root mover and drop the weaker half.
    fn halve(&mut self) {
        let root = self.tree.root();
        let mover = self.game.mover(&self.tree.get(root).state);
        let values: Vec<f64> = self
            .tree
            .children(root)
            .iter()
            .map(|&id| self.tree.get(id).stats.mean(mover))
            .collect();

        let discarded = discard_indices(&values);
        for &index in &discarded {
            self.tree.remove_child(root, index);
        }
        self.rounds_completed += 1;

        debug!(
            "Round {} ranked: kept {}, discarded {:?}",
            self.rounds_completed,
            self.survivors(),
            discarded
        );
    }

    /// One select/complete/backpropagate pass below `from`.
    ///
    /// Descends until it creates a fresh child or hits a node with nothing
    /// left to select. Returns the node the playout started from.
    fn search_step(&mut self, from: NodeId) -> NodeId {
        let mut current = from;
        loop {
            let node = self.tree.get(current);
            if node.terminal || (node.unexpanded.is_empty() && node.children.is_empty()) {
                break;
            }
            current = select(
                &mut self.tree,
                self.game,
                current,
                self.exploration,
                &mut *self.rng,
            );
            if self.tree.get(current).stats.visit_count == 0 {
                break;
            }
        }

        let utilities = rollout::complete(self.game, &self.tree.get(current).state, &mut *self.rng);
        backpropagate(&mut self.tree, current, &utilities);
        self.iterations += 1;
        current
    }

    /// Robust-child move over the current survivors.
    ///
    /// # Errors
    /// Returns `SearchError::EmptyRoot` if no arm was ever sampled.
    pub fn best_move(&mut self) -> Result<G::Move, SearchError> {
        finalize(&self.tree, &mut *self.rng)
    }

    /// Number of root children still in the running.
    pub fn survivors(&self) -> usize {
        self.tree.children(self.tree.root()).len()
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The session's tree.
    pub fn tree(&self) -> &Tree<G> {
        &self.tree
    }

    /// Search steps completed so far, bootstrap included.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Search steps spent in halving rounds, the ones the iteration cap counts.
    pub fn round_steps(&self) -> usize {
        self.round_steps
    }

    /// Halving rounds completed so far.
    pub fn rounds_completed(&self) -> usize {
        self.rounds_completed
    }

    /// The schedule this session runs.
    pub fn schedule(&self) -> HalvingSchedule {
        self.schedule
    }
}
