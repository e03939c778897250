//! Backpropagation of playout results.

use crate::node::NodeId;
use crate::tree::Tree;
use shuct_core::{Game, Utilities};

/// Fold `utilities` into every node from `leaf` up to the root, inclusive.
pub fn backpropagate<G: Game>(tree: &mut Tree<G>, leaf: NodeId, utilities: &Utilities) {
    let mut current = Some(leaf);
    while let Some(id) = current {
        let node = tree.get_mut(id);
        node.stats.record(utilities);
        current = node.parent;
    }
}
