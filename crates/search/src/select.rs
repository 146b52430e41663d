//! Tree-guided action selection.
//!
//! A candidate sequence is generated in two phases: a tree-guided prefix
//! (epsilon-greedy over child values) followed by a uniform random suffix
//! once the walk steps onto an action that was never explored.

use crate::node::NodeId;
use crate::tree::Tree;
use brute_core::{Action, ActionSpace};
use rand::seq::SliceRandom;
use rand::Rng;

/// Where the selection walk currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Still inside explored territory, at this node.
    Guided(NodeId),
    /// Fell off the explored frontier; random for the remainder.
    Lost,
}

/// Epsilon-greedy selector over optimistic node values.
#[derive(Clone, Copy, Debug)]
pub struct Selector {
    exploration: f64,
}

impl Selector {
    pub fn new(exploration: f64) -> Self {
        Self { exploration }
    }

    /// Exploration rate at a node with `visits` visits.
    ///
    /// `epsilon = c / ln(visits + 2)`: more-visited nodes explore less.
    pub fn epsilon(&self, visits: u64) -> f64 {
        self.exploration / (visits as f64 + 2.0).ln()
    }

    /// Produce a candidate sequence of exactly `len` actions.
    ///
    /// Reads the tree only; safe to call from many workers at once.
    pub fn select<R: Rng>(
        &self,
        tree: &Tree,
        space: ActionSpace,
        len: usize,
        rng: &mut R,
    ) -> Vec<Action> {
        let mut mode = Mode::Guided(NodeId::ROOT);
        let mut actions = Vec::with_capacity(len);

        for _ in 0..len {
            let action = match mode {
                Mode::Lost => space.sample(rng),
                Mode::Guided(id) => {
                    let action = self.choose(tree, id, space, rng);
                    mode = match tree.child(id, action) {
                        Some(child) => Mode::Guided(child),
                        None => Mode::Lost,
                    };
                    action
                }
            };
            actions.push(action);
        }

        actions
    }

    /// One epsilon-greedy decision at an explored node.
    fn choose<R: Rng>(&self, tree: &Tree, id: NodeId, space: ActionSpace, rng: &mut R) -> Action {
        let node = tree.get(id);
        if rng.gen::<f64>() < self.epsilon(node.visits()) {
            return space.sample(rng);
        }

        // Missing children count as -inf, so an unexplored node ties everything
        let value = |action: Action| {
            node.child(action)
                .map(|child| tree.get(child).value())
                .unwrap_or(f64::NEG_INFINITY)
        };
        let best = space
            .iter()
            .map(value)
            .fold(f64::NEG_INFINITY, f64::max);
        let greedy: Vec<Action> = space.iter().filter(|&a| value(a) == best).collect();

        greedy
            .choose(rng)
            .copied()
            .unwrap_or_else(|| space.sample(rng))
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::new(crate::config::EXPLORATION_PARAM)
    }
}
