//! Arena-allocated search tree.
//!
//! Using a Vec<Node> with indices provides better cache locality
//! and simpler ownership compared to Rc<RefCell<Node>>. The tree only ever
//! grows: nodes are added by [`Tree::backup`] and never removed.

use crate::node::{Node, NodeId};
use crate::rollout::Rollout;
use brute_core::Action;

/// Arena-allocated tree of explored action sequences.
///
/// Owned exclusively by the orchestrator. Workers only ever see `&Tree`,
/// so all mutation happens in the sequential merge phase.
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create a new tree with a single unvisited root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new()],
        }
    }

    /// Get a reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId does not belong to this tree.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn root(&self) -> &Node {
        self.get(NodeId::ROOT)
    }

    /// Child of `id` reached by `action`, if it was ever explored.
    pub fn child(&self, id: NodeId, action: Action) -> Option<NodeId> {
        self.get(id).child(action)
    }

    /// Get or create the child of `id` reached by `action`.
    ///
    /// Returns the child and whether it was newly created.
    pub fn add_child(&mut self, id: NodeId, action: Action) -> (NodeId, bool) {
        if let Some(child) = self.child(id, action) {
            return (child, false);
        }
        let child = NodeId(self.nodes.len());
        self.nodes.push(Node::new());
        self.get_mut(id).children.insert(action, child);
        (child, true)
    }

    /// Total number of nodes ever created, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root always exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node with its ID, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// Node reached by following `actions` from the root, if fully explored.
    pub fn walk(&self, actions: &[Action]) -> Option<NodeId> {
        actions
            .iter()
            .try_fold(NodeId::ROOT, |id, &action| self.child(id, action))
    }

    /// Fold a rollout back into the tree.
    ///
    /// Every node on the executed path, root included, gets
    /// `value = max(value, reward)` and `visits += 1`. Missing nodes along the
    /// path are created. Returns the number of newly created nodes.
    pub fn backup(&mut self, rollout: &Rollout) -> usize {
        let reward = rollout.reward;
        let mut created = 0;
        let mut id = NodeId::ROOT;
        self.get_mut(id).observe(reward);
        for &action in &rollout.actions {
            let (child, new) = self.add_child(id, action);
            created += new as usize;
            id = child;
            self.get_mut(id).observe(reward);
        }
        created
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rollout(actions: &[Action], reward: f64) -> Rollout {
        Rollout {
            actions: actions.to_vec(),
            reward,
        }
    }

    #[test]
    fn test_tree_creation() {
        let tree = Tree::new();
        assert_eq!(tree.len(), 1); // Root node
        assert!(!tree.is_empty());
        assert_eq!(tree.root().visits(), 0);
        assert_eq!(tree.root().value(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_tree_add_child() {
        let mut tree = Tree::new();
        let (child, new) = tree.add_child(NodeId::ROOT, 2);
        assert!(new);
        assert_eq!(child.index(), 1); // After root
        assert_eq!(tree.child(NodeId::ROOT, 2), Some(child));
        assert_eq!(tree.child(NodeId::ROOT, 1), None);

        let (again, new) = tree.add_child(NodeId::ROOT, 2);
        assert!(!new);
        assert_eq!(again, child);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_backup_creates_path() {
        let mut tree = Tree::new();
        let created = tree.backup(&rollout(&[0, 1, 1], 4.0));
        assert_eq!(created, 3);
        assert_eq!(tree.len(), 4);

        let leaf = tree.walk(&[0, 1, 1]).unwrap();
        assert_eq!(tree.get(leaf).value(), 4.0);
        assert_eq!(tree.get(leaf).visits(), 1);
        assert_eq!(tree.root().value(), 4.0);
        assert_eq!(tree.root().visits(), 1);
    }

    #[test]
    fn test_backup_shared_prefix() {
        let mut tree = Tree::new();
        tree.backup(&rollout(&[0, 1], 4.0));
        let created = tree.backup(&rollout(&[0, 2, 3], 1.0));

        // Only the edges 0->2 and 2->3 are new
        assert_eq!(created, 2);
        assert_eq!(tree.len(), 5);

        let shared = tree.walk(&[0]).unwrap();
        assert_eq!(tree.get(shared).visits(), 2);
        assert_eq!(tree.get(shared).value(), 4.0); // Never lowered

        let low = tree.walk(&[0, 2]).unwrap();
        assert_eq!(tree.get(low).value(), 1.0);
    }

    #[test]
    fn test_backup_empty_trace_touches_root_only() {
        let mut tree = Tree::new();
        assert_eq!(tree.backup(&rollout(&[], -2.0)), 0);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root().visits(), 1);
        assert_eq!(tree.root().value(), -2.0);
    }

    #[test]
    fn test_iter_and_children() {
        let mut tree = Tree::new();
        tree.backup(&rollout(&[2, 0], 1.0));
        tree.backup(&rollout(&[1], 1.0));

        let ids: Vec<usize> = tree.iter().map(|(id, _)| id.index()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);

        let actions: Vec<Action> = tree.root().children().map(|(a, _)| a).collect();
        assert_eq!(actions, vec![1, 2]);
    }

    #[test]
    fn test_walk_unexplored() {
        let mut tree = Tree::new();
        tree.backup(&rollout(&[1], 0.0));
        assert_eq!(tree.walk(&[]), Some(NodeId::ROOT));
        assert!(tree.walk(&[1]).is_some());
        assert_eq!(tree.walk(&[1, 0]), None);
        assert_eq!(tree.walk(&[0]), None);
    }
}
