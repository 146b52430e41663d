//! Round-based parallel search.
//!
//! Each round samples a batch of candidate sequences against a fixed tree,
//! executes them in parallel on private environments, then merges the results
//! into the tree one at a time in worker order.

use crate::{
    config::BruteConfig,
    rollout::{execute, Rollout},
    select::Selector,
    tree::Tree,
};
use brute_core::{Action, ActionSpace, BruteError, Environment, EnvironmentFactory, Result};
use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Result of one search round.
#[derive(Clone, Debug, PartialEq)]
pub struct Round {
    /// Executed actions of the round's best rollout.
    pub actions: Vec<Action>,

    /// Reward of the round's best rollout.
    pub reward: f64,

    /// Nodes added to the tree by this round's merges.
    pub new_nodes: usize,

    /// Number of rollouts executed this round.
    pub rollouts: usize,

    /// Environment steps executed across all of this round's rollouts.
    pub steps: usize,
}

/// The Brute: deterministic-environment tree search.
///
/// Generic over the environment factory `F`. The tree is owned here and only
/// mutated through `&mut self`; workers get `&Tree` for the parallel phase.
pub struct Brute<F: EnvironmentFactory> {
    factory: F,
    config: BruteConfig,
    selector: Selector,
    space: ActionSpace,
    tree: Tree,
    rng: ChaCha8Rng,
    pool: Option<ThreadPool>,
    workers: usize,
}

impl<F: EnvironmentFactory> Brute<F> {
    /// Create a new search over environments built by `factory`.
    ///
    /// Builds one environment to read its action space. The worker pool is
    /// built once and reused every round; if the requested size cannot be
    /// satisfied, fewer workers are used.
    pub fn new(factory: F, config: BruteConfig) -> Result<Self> {
        if config.max_episode_steps == 0 {
            return Err(BruteError::InvalidConfig(
                "max_episode_steps must be at least 1".to_string(),
            ));
        }

        let mut env = factory.make()?;
        let space = env.action_space();
        env.close()?;

        let (pool, workers) = build_pool(config.effective_workers());

        Ok(Self {
            selector: Selector::new(config.exploration),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            factory,
            config,
            space,
            tree: Tree::new(),
            pool,
            workers,
        })
    }

    /// Run one round: parallel select and execute, then sequential merge.
    pub fn run(&mut self) -> Result<Round> {
        let seeds: Vec<u64> = (0..self.workers).map(|_| self.rng.gen()).collect();

        let results: Vec<Result<Rollout>> = {
            let tree = &self.tree;
            let factory = &self.factory;
            let selector = self.selector;
            let space = self.space;
            let len = self.config.max_episode_steps;

            let sample = |seed: u64| -> Result<Rollout> {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let candidate = selector.select(tree, space, len, &mut rng);
                if candidate.len() != len {
                    return Err(BruteError::MalformedSequence {
                        expected: len,
                        actual: candidate.len(),
                    });
                }
                execute(factory, &candidate)
            };

            match &self.pool {
                Some(pool) => pool.install(|| seeds.par_iter().map(|&seed| sample(seed)).collect()),
                None => seeds.iter().map(|&seed| sample(seed)).collect(),
            }
        };
        let mut rollouts = results.into_iter().collect::<Result<Vec<_>>>()?;

        let mut new_nodes = 0;
        for rollout in &rollouts {
            new_nodes += self.tree.backup(rollout);
        }

        let steps = rollouts.iter().map(Rollout::len).sum();
        let count = rollouts.len();
        let best = rollouts.swap_remove(winner(&rollouts));

        debug!(
            "round: {} rollouts, {} steps, best {} over {} actions, {} new nodes ({} total)",
            count,
            steps,
            best.reward,
            best.len(),
            new_nodes,
            self.tree.len()
        );

        Ok(Round {
            actions: best.actions,
            reward: best.reward,
            new_nodes,
            rollouts: count,
            steps,
        })
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Total nodes created so far, root included.
    pub fn node_count(&self) -> usize {
        self.tree.len()
    }

    pub fn action_space(&self) -> ActionSpace {
        self.space
    }

    /// Rollouts executed per round.
    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn config(&self) -> &BruteConfig {
        &self.config
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }
}

/// Index of the rollout with the strictly greatest reward; first one wins ties.
///
/// # Panics
/// Panics if `rollouts` is empty.
pub(crate) fn winner(rollouts: &[Rollout]) -> usize {
    let mut best = 0;
    for (i, rollout) in rollouts.iter().enumerate().skip(1) {
        if rollout.reward > rollouts[best].reward {
            best = i;
        }
    }
    best
}

/// Build a worker pool of `requested` threads, halving on failure.
///
/// A single worker runs inline on the calling thread with no pool.
fn build_pool(requested: usize) -> (Option<ThreadPool>, usize) {
    let mut threads = requested.max(1);
    while threads > 1 {
        match ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("brute-worker-{}", i))
            .build()
        {
            Ok(pool) => return (Some(pool), threads),
            Err(err) => {
                warn!("could not start {} workers ({}), retrying with fewer", threads, err);
                threads /= 2;
            }
        }
    }
    (None, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::EarlyExit;
    use brute_core::Step;

    fn rollout(actions: &[Action], reward: f64) -> Rollout {
        Rollout {
            actions: actions.to_vec(),
            reward,
        }
    }

    fn brute(seed: u64, workers: usize) -> Brute<fn() -> Result<EarlyExit>> {
        let config = BruteConfig::with_episode_steps(3).workers(workers).seed(seed);
        Brute::new(EarlyExit::make as fn() -> Result<EarlyExit>, config).unwrap()
    }

    #[test]
    fn test_winner_strict_max() {
        let rollouts = vec![rollout(&[0], 1.0), rollout(&[1], 5.0), rollout(&[0, 0], 3.0)];
        assert_eq!(winner(&rollouts), 1);
    }

    #[test]
    fn test_winner_ties_first() {
        let rollouts = vec![rollout(&[0], 2.0), rollout(&[1], 5.0), rollout(&[0, 1], 5.0)];
        assert_eq!(winner(&rollouts), 1);
        assert_eq!(winner(&[rollout(&[], 0.0)]), 0);
    }

    #[test]
    fn test_round_basic() {
        let mut brute = brute(42, 4);
        assert_eq!(brute.workers(), 4);
        assert_eq!(brute.action_space().n(), 2);

        let round = brute.run().unwrap();
        assert_eq!(round.rollouts, 4);
        assert!(!round.actions.is_empty() && round.actions.len() <= 3);
        assert!(round.steps >= round.actions.len());

        // Root visited once per rollout; new nodes plus root make up the tree
        assert_eq!(brute.tree().root().visits(), 4);
        assert_eq!(brute.node_count(), round.new_nodes + 1);
        assert_eq!(brute.tree().root().value(), round.reward);
    }

    #[test]
    fn test_round_inline_single_worker() {
        let mut brute = brute(1, 1);
        assert_eq!(brute.workers(), 1);
        let round = brute.run().unwrap();
        assert_eq!(round.rollouts, 1);
        assert_eq!(round.new_nodes, round.actions.len());
    }

    #[test]
    fn test_round_deterministic() {
        let run = |seed| {
            let mut brute = brute(seed, 3);
            (0..5).map(|_| brute.run().unwrap()).collect::<Vec<_>>()
        };
        assert_eq!(run(12345), run(12345));
    }

    #[test]
    fn test_converges_on_early_exit() {
        // A high exploration constant keeps trying the untaken root action
        let config = BruteConfig::with_episode_steps(3)
            .workers(2)
            .seed(7)
            .exploration(1.0);
        let mut brute = Brute::new(EarlyExit::make as fn() -> Result<EarlyExit>, config).unwrap();
        let mut best = f64::NEG_INFINITY;
        let mut best_actions = Vec::new();
        for _ in 0..50 {
            let round = brute.run().unwrap();
            if round.reward > best {
                best = round.reward;
                best_actions = round.actions;
            }
        }
        assert_eq!(best, 5.0);
        assert_eq!(best_actions, vec![1]);
        assert_eq!(brute.tree().root().value(), 5.0);
    }

    /// Reports a non-deterministic failure on its first step.
    struct Broken;

    impl Environment for Broken {
        type Observation = ();

        fn reset(&mut self) -> Result<()> {
            Ok(())
        }

        fn step(&mut self, _action: Action) -> Result<Step<()>> {
            Err(BruteError::Environment("lost sync".to_string()))
        }

        fn action_space(&self) -> ActionSpace {
            ActionSpace::fixed(3)
        }
    }

    fn broken() -> Result<Broken> {
        Ok(Broken)
    }

    #[test]
    fn test_round_surfaces_env_error() {
        let config = BruteConfig::with_episode_steps(5).workers(2);
        let mut brute = Brute::new(broken as fn() -> Result<Broken>, config).unwrap();
        assert!(matches!(brute.run(), Err(BruteError::Environment(_))));
        // Nothing merged from a failed round
        assert_eq!(brute.node_count(), 1);
        assert_eq!(brute.tree().root().visits(), 0);
    }

    #[test]
    fn test_new_surfaces_factory_error() {
        let failing = || -> Result<EarlyExit> { Err(BruteError::Environment("no rom".to_string())) };
        assert!(Brute::new(failing, BruteConfig::default().workers(1)).is_err());
    }

    #[test]
    fn test_new_rejects_zero_episode_steps() {
        let config = BruteConfig::with_episode_steps(0).workers(1);
        let result = Brute::new(EarlyExit::make as fn() -> Result<EarlyExit>, config);
        assert!(matches!(result, Err(BruteError::InvalidConfig(_))));
    }

    #[test]
    fn test_build_pool_single() {
        let (pool, workers) = build_pool(1);
        assert!(pool.is_none());
        assert_eq!(workers, 1);

        let (pool, workers) = build_pool(2);
        assert!(pool.is_some());
        assert_eq!(workers, 2);
    }
}
