//! Child selection: UCB1 descent with lazy expansion, and the final
//! robust-child choice at the root.
//!
//! Ties are broken uniformly at random with a running reservoir counter, so
//! the number of tied candidates never has to be known in advance.

use crate::error::SearchError;
use crate::node::NodeId;
use crate::tree::Tree;
use rand::Rng;
use shuct_core::Game;
use std::cmp::Ordering;

/// Running argmax with uniform random tie-breaking.
///
/// The i-th candidate that ties the current best replaces it with
/// probability `1/i`, which leaves every tied candidate equally likely.
#[derive(Clone, Debug)]
pub struct Reservoir<T, V> {
    best: Option<(T, V)>,
    ties: u32,
}

impl<T, V: PartialOrd> Reservoir<T, V> {
    /// Empty reservoir.
    pub fn new() -> Self {
        Self { best: None, ties: 0 }
    }

    /// Offer a candidate with its score.
    pub fn offer<R: Rng>(&mut self, item: T, value: V, rng: &mut R) {
        let ordering = self.best.as_ref().map(|(_, best)| value.partial_cmp(best));
        match ordering {
            None | Some(Some(Ordering::Greater)) => {
                self.best = Some((item, value));
                self.ties = 1;
            }
            Some(Some(Ordering::Equal)) => {
                self.ties += 1;
                if rng.gen_range(0..self.ties) == 0 {
                    self.best = Some((item, value));
                }
            }
            _ => {}
        }
    }

    /// The chosen candidate, if any was offered.
    pub fn into_inner(self) -> Option<T> {
        self.best.map(|(item, _)| item)
    }
}

impl<T, V: PartialOrd> Default for Reservoir<T, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the next node below `id`, expanding a new child if any move is
/// still unexpanded.
///
/// A freshly expanded child comes back with zero visits. Otherwise the child
/// maximising `mean(mover) + sqrt(exploration * ln(N) / n)` is returned.
///
/// # Panics
/// Panics if `id` is terminal or has neither moves nor children, or if a
/// candidate child has never been visited.
pub fn select<G: Game, R: Rng>(
    tree: &mut Tree<G>,
    game: &G,
    id: NodeId,
    exploration: f64,
    rng: &mut R,
) -> NodeId {
    let node = tree.get_mut(id);
    debug_assert!(!node.terminal, "select called on a terminal node");

    if !node.unexpanded.is_empty() {
        let mv = node.unexpanded.remove(rng.gen_range(0..node.unexpanded.len()));
        let state = game.apply(&node.state, mv);
        return tree.create_node(game, Some(id), Some(mv), state);
    }

    let node = tree.get(id);
    let mover = game.mover(&node.state);
    let scaled_log = exploration * (node.stats.visit_count.max(1) as f64).ln();

    let mut best = Reservoir::new();
    for &child_id in &node.children {
        let child = &tree.get(child_id).stats;
        assert!(
            child.visit_count > 0,
            "BUG: unvisited child reached UCB1 ranking"
        );
        let visits = child.visit_count as f64;
        let exploit = child.mean(mover);
        let explore = (scaled_log / visits).sqrt();
        best.offer(child_id, exploit + explore, rng);
    }

    best.into_inner()
        .expect("BUG: select called on a node without moves or children")
}

/// Robust child: the move of the most-visited surviving root child.
///
/// # Errors
/// Returns `SearchError::EmptyRoot` if the root has no children.
pub fn finalize<G: Game, R: Rng>(tree: &Tree<G>, rng: &mut R) -> Result<G::Move, SearchError> {
    let mut best = Reservoir::new();
    for &child_id in tree.children(tree.root()) {
        let child = tree.get(child_id);
        best.offer(child_id, child.stats.visit_count, rng);
    }

    best.into_inner()
        .and_then(|id| tree.get(id).mv)
        .ok_or(SearchError::EmptyRoot)
}
