//! Search configuration parameters.
//!
//! These parameters control the exploration rate, episode length and degree of
//! parallelism of the Brute.

use std::path::PathBuf;

/// Exploration constant in `epsilon = EXPLORATION_PARAM / ln(visits + 2)`.
pub const EXPLORATION_PARAM: f64 = 0.005;

/// Default per-episode step cap.
pub const DEFAULT_MAX_EPISODE_STEPS: usize = 4500;

/// Default total simulated-timestep budget before the driver halts.
pub const DEFAULT_TIMESTEP_LIMIT: u64 = 100_000_000;

/// Default recording path for new best trajectories.
pub const DEFAULT_OUTPUT: &str = "best.bk2.msgpack";

/// Search configuration parameters.
#[derive(Clone, Debug)]
pub struct BruteConfig {
    /// Exploration constant.
    /// 0 = always greedy inside the explored tree.
    pub exploration: f64,

    /// Length of every candidate action sequence.
    /// Rollouts may terminate earlier; the unused suffix is discarded.
    pub max_episode_steps: usize,

    /// Number of parallel rollouts per round.
    /// `None` = available hardware parallelism.
    pub workers: Option<usize>,

    /// Seed for the orchestrator's random number generator.
    pub seed: u64,
}

impl Default for BruteConfig {
    fn default() -> Self {
        Self {
            exploration: EXPLORATION_PARAM,
            max_episode_steps: DEFAULT_MAX_EPISODE_STEPS,
            workers: None,
            seed: 42,
        }
    }
}

impl BruteConfig {
    /// Create a new config with the specified episode length.
    pub fn with_episode_steps(max_episode_steps: usize) -> Self {
        Self {
            max_episode_steps,
            ..Default::default()
        }
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    /// Resolve the requested worker count.
    ///
    /// Falls back to available parallelism, and to 1 if that is unknown.
    pub fn effective_workers(&self) -> usize {
        self.workers
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1)
    }
}

/// Driver loop configuration.
#[derive(Clone, Debug)]
pub struct DriverConfig {
    /// The driver halts once cumulative executed timesteps exceed this.
    pub timestep_limit: u64,

    /// Where to record each new best trajectory.
    pub output: PathBuf,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            timestep_limit: DEFAULT_TIMESTEP_LIMIT,
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl DriverConfig {
    pub fn with_timestep_limit(timestep_limit: u64) -> Self {
        Self {
            timestep_limit,
            ..Default::default()
        }
    }
}
