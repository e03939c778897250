//! Arena-allocated search tree.
//!
//! Using a Vec of slots with indices provides better cache locality and
//! simpler ownership compared to Rc<RefCell<Node>>. Removing a subtree
//! frees its slots for reuse by later expansions.

use crate::node::{Node, NodeId};
use shuct_core::Game;

/// Arena-allocated search tree.
///
/// Nodes are stored in a contiguous vector and referenced by index. The
/// root is created together with the tree and is never removed.
pub struct Tree<G: Game> {
    slots: Vec<Option<Node<G>>>,
    free: Vec<NodeId>,
    root: NodeId,
    live: usize,
}

impl<G: Game> Tree<G> {
    /// Create a tree whose root holds `state`.
    pub fn new(game: &G, state: G::State) -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId(0),
            live: 0,
        };
        tree.root = tree.create_node(game, None, None, state);
        tree
    }

    /// The root node's ID.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId is invalid or its subtree was removed.
    pub fn get(&self, id: NodeId) -> &Node<G> {
        self.slots[id.0]
            .as_ref()
            .expect("BUG: NodeId refers to a removed node")
    }

    /// Get a mutable reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId is invalid or its subtree was removed.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<G> {
        self.slots[id.0]
            .as_mut()
            .expect("BUG: NodeId refers to a removed node")
    }

    /// Children of a node, in creation order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.get(id).children
    }

    /// Create a node for `state` and, if `parent` is given, append it to the
    /// parent's children.
    pub fn create_node(
        &mut self,
        game: &G,
        parent: Option<NodeId>,
        mv: Option<G::Move>,
        state: G::State,
    ) -> NodeId {
        let node = Node::new(game, parent, mv, state);
        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id.0] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        };
        self.live += 1;

        if let Some(parent) = parent {
            self.get_mut(parent).children.push(id);
        }
        id
    }

    /// Detach `parent.children[index]` and release its whole subtree.
    ///
    /// Removal is positional: later children shift down by one. Callers
    /// removing several children in one batch must go in descending index
    /// order. Returns the number of nodes released.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> usize {
        let child = self.get_mut(parent).children.remove(index);

        let mut released = 0;
        let mut stack = vec![child];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.slots[id.0].take() {
                stack.extend(node.children);
                self.free.push(id);
                released += 1;
            }
        }
        self.live -= released;
        released
    }

    /// Walk from `id` up to the root, inclusive.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&current| self.get(current).parent)
    }

    /// IDs of every live node, in arena order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| NodeId(i))
    }

    /// Get the number of live nodes in the tree.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if the tree is empty (never true as the root always exists).
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}
