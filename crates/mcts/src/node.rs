//! Search tree node types.
//!
//! Nodes live in an arena and refer to each other by index: ownership flows
//! down through `children`, and `parent` is a plain back-reference used for
//! backpropagation.

use shuct_core::{Game, PlayerId, Utilities};

/// Index into the node arena.
///
/// This is a lightweight handle that references a node in the tree.
/// A handle stays valid until the subtree holding its node is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw arena slot, for diagnostics.
    pub fn slot(self) -> usize {
        self.0
    }
}

/// Statistics accumulated by backpropagation.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStats {
    /// Number of search steps whose descent passed through this node.
    pub visit_count: u32,

    /// Sum of utilities per player. Slot 0 is unused so a `PlayerId`
    /// indexes directly.
    pub score_sums: Vec<f64>,
}

impl NodeStats {
    /// Empty stats for a game with `num_players` players.
    pub fn new(num_players: usize) -> Self {
        Self {
            visit_count: 0,
            score_sums: vec![0.0; num_players + 1],
        }
    }

    /// Fold one sample into the stats.
    pub fn record(&mut self, utilities: &Utilities) {
        self.visit_count += 1;
        for (player, utility) in utilities.iter() {
            if let Some(sum) = self.score_sums.get_mut(player.index()) {
                *sum += utility;
            }
        }
    }

    /// Mean utility for `player`.
    ///
    /// Returns 0.0 if the node has never been visited.
    pub fn mean(&self, player: PlayerId) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.score_sums.get(player.index()).copied().unwrap_or(0.0) / self.visit_count as f64
        }
    }
}

/// A node in the search tree.
///
/// Each node owns a snapshot of the game state it represents along with
/// the moves that have not been turned into children yet.
pub struct Node<G: Game> {
    /// Node that created this one (None for root).
    pub parent: Option<NodeId>,

    /// Move that led from the parent's state to this one (None for root).
    pub mv: Option<G::Move>,

    /// Game state at this node.
    pub state: G::State,

    /// Whether `state` is terminal, cached at creation.
    pub terminal: bool,

    /// Backpropagated statistics.
    pub stats: NodeStats,

    /// Children in creation order.
    pub children: Vec<NodeId>,

    /// Legal moves not yet expanded into children.
    pub unexpanded: Vec<G::Move>,
}

impl<G: Game> Node<G> {
    /// Create a node for `state`, deriving its unexpanded moves from the game.
    pub fn new(game: &G, parent: Option<NodeId>, mv: Option<G::Move>, state: G::State) -> Self {
        let terminal = game.is_terminal(&state);
        let unexpanded = if terminal {
            Vec::new()
        } else {
            game.legal_moves(&state)
        };

        Self {
            parent,
            mv,
            state,
            terminal,
            stats: NodeStats::new(game.num_players()),
            children: Vec::new(),
            unexpanded,
        }
    }

    /// True once every legal move has a child.
    pub fn is_fully_expanded(&self) -> bool {
        self.unexpanded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_stats_mean() {
        let mut stats = NodeStats::new(2);
        let p1 = PlayerId::FIRST;

        // Unvisited node has mean 0
        assert_eq!(stats.mean(p1), 0.0);

        stats.record(&Utilities::new(vec![1.0, -1.0]).unwrap());
        stats.record(&Utilities::new(vec![0.0, 0.0]).unwrap());
        assert_eq!(stats.visit_count, 2);
        assert!((stats.mean(p1) - 0.5).abs() < 1e-12);
        assert!((stats.mean(p1.next(2)) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_node_stats_slot_zero_unused() {
        let mut stats = NodeStats::new(3);
        stats.record(&Utilities::new(vec![1.0, 0.5, -1.0]).unwrap());
        assert_eq!(stats.score_sums.len(), 4);
        assert_eq!(stats.score_sums[0], 0.0);
        assert_eq!(&stats.score_sums[1..], &[1.0, 0.5, -1.0]);
    }
}
