//! Search tree node types.
//!
//! Uses arena allocation with indices for cache locality and simpler memory management.

use brute_core::Action;
use std::collections::HashMap;

/// Index into the node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// One position in the action-sequence tree.
///
/// Reachable from the root by a unique sequence of actions.
///
/// Invariants:
/// - `value` never decreases (optimistic backup).
/// - `visits` never decreases.
/// - A child exists iff at least one rollout executed that action from here.
#[derive(Clone, Debug)]
pub struct Node {
    /// Best cumulative reward of any rollout through this node.
    /// `-inf` until the first visit.
    pub(crate) value: f64,

    /// Number of rollouts that passed through this node.
    pub(crate) visits: u64,

    /// Children keyed by the action leading to them.
    pub(crate) children: HashMap<Action, NodeId>,
}

impl Node {
    /// Create a new unvisited node.
    pub fn new() -> Self {
        Self {
            value: f64::NEG_INFINITY,
            visits: 0,
            children: HashMap::new(),
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn visits(&self) -> u64 {
        self.visits
    }

    /// Child reached by `action`, if that action was ever tried from here.
    pub fn child(&self, action: Action) -> Option<NodeId> {
        self.children.get(&action).copied()
    }

    /// Explored children in ascending action order.
    pub fn children(&self) -> impl Iterator<Item = (Action, NodeId)> + '_ {
        let mut children: Vec<(Action, NodeId)> =
            self.children.iter().map(|(&a, &id)| (a, id)).collect();
        children.sort_unstable_by_key(|&(a, _)| a);
        children.into_iter()
    }

    /// Number of distinct actions tried from this node.
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// Fold one rollout's reward into this node's statistics.
    pub(crate) fn observe(&mut self, reward: f64) {
        self.value = self.value.max(reward);
        self.visits += 1;
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}
