use crate::{ActionSpace, Result};
use std::collections::HashMap;

/// A discrete action identifier in `[0, action_space.n())`.
pub type Action = usize;

/// Auxiliary diagnostics reported alongside a step.
pub type Info = HashMap<String, serde_json::Value>;

/// Outcome of applying one action to an environment.
#[derive(Clone, Debug)]
pub struct Step<O> {
    /// Observation after the action was applied.
    pub observation: O,

    /// Reward accrued by this step.
    pub reward: f64,

    /// Whether the episode has ended.
    pub done: bool,

    /// Diagnostics (e.g. truncation markers set by decorators).
    pub info: Info,
}

impl<O> Step<O> {
    /// A step with empty diagnostics.
    pub fn new(observation: O, reward: f64, done: bool) -> Self {
        Self {
            observation,
            reward,
            done,
            info: Info::new(),
        }
    }
}

/// An environment the Brute can search.
///
/// The search relies on one contract only: composing `step` after `reset`
/// must be a pure deterministic function of the action sequence. Replaying
/// an identical prefix from a fresh reset must reproduce the identical
/// reward trajectory and termination point. Violations are not detected;
/// they silently degrade the search tree.
pub trait Environment: Send {
    /// The observation format reported by `reset` and `step`.
    type Observation;

    /// Resets to the initial state, returning the initial observation.
    fn reset(&mut self) -> Result<Self::Observation>;

    /// Applies an action, returning the resulting observation, reward and termination flag.
    fn step(&mut self, action: Action) -> Result<Step<Self::Observation>>;

    /// The discrete set of legal actions.
    fn action_space(&self) -> ActionSpace;

    /// Releases any resources held by the environment.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Builds fresh environment instances.
///
/// Shared by reference across parallel workers, so it must be `Sync`.
/// Every call must yield an instance obeying the same determinism contract.
pub trait EnvironmentFactory: Sync {
    type Env: Environment;

    /// Construct a new environment instance.
    fn make(&self) -> Result<Self::Env>;
}

impl<E, F> EnvironmentFactory for F
where
    E: Environment,
    F: Fn() -> Result<E> + Sync,
{
    type Env = E;

    fn make(&self) -> Result<E> {
        self()
    }
}
