//! Environment decorators.
//!
//! These compose around an environment before the search receives it. Both
//! preserve the determinism contract of the wrapped environment.

use crate::{Action, ActionSpace, Environment, Result, Step};

/// Info key set by [`TimeLimit`] when it forces termination.
pub const TRUNCATED: &str = "TimeLimit.truncated";

/// Repeats each chosen action across several underlying steps.
///
/// Rewards are summed; the last observation, termination flag and info are
/// reported. Repetition stops early if the wrapped environment terminates.
#[derive(Debug)]
pub struct Frameskip<E> {
    env: E,
    skip: usize,
}

impl<E: Environment> Frameskip<E> {
    /// Default number of underlying steps per action.
    pub const DEFAULT_SKIP: usize = 4;

    /// Wrap `env`, repeating each action `skip` times (at least once).
    pub fn new(env: E, skip: usize) -> Self {
        Self {
            env,
            skip: skip.max(1),
        }
    }

    pub fn skip(&self) -> usize {
        self.skip
    }

    pub fn inner(&self) -> &E {
        &self.env
    }
}

impl<E: Environment> Environment for Frameskip<E> {
    type Observation = E::Observation;

    fn reset(&mut self) -> Result<Self::Observation> {
        self.env.reset()
    }

    fn step(&mut self, action: Action) -> Result<Step<Self::Observation>> {
        let mut total = 0.0;
        let mut step = self.env.step(action)?;
        total += step.reward;
        for _ in 1..self.skip {
            if step.done {
                break;
            }
            step = self.env.step(action)?;
            total += step.reward;
        }
        step.reward = total;
        Ok(step)
    }

    fn action_space(&self) -> ActionSpace {
        self.env.action_space()
    }

    fn close(&mut self) -> Result<()> {
        self.env.close()
    }
}

/// Forces termination once a configured number of steps has elapsed since reset.
#[derive(Debug)]
pub struct TimeLimit<E> {
    env: E,
    max_episode_steps: usize,
    elapsed: usize,
}

impl<E: Environment> TimeLimit<E> {
    pub fn new(env: E, max_episode_steps: usize) -> Self {
        Self {
            env,
            max_episode_steps,
            elapsed: 0,
        }
    }

    /// Steps taken since the last reset.
    pub fn elapsed(&self) -> usize {
        self.elapsed
    }

    pub fn inner(&self) -> &E {
        &self.env
    }
}

impl<E: Environment> Environment for TimeLimit<E> {
    type Observation = E::Observation;

    fn reset(&mut self) -> Result<Self::Observation> {
        self.elapsed = 0;
        self.env.reset()
    }

    fn step(&mut self, action: Action) -> Result<Step<Self::Observation>> {
        let mut step = self.env.step(action)?;
        self.elapsed += 1;
        if self.elapsed >= self.max_episode_steps {
            step.done = true;
            step.info.insert(TRUNCATED.to_string(), serde_json::Value::Bool(true));
        }
        Ok(step)
    }

    fn action_space(&self) -> ActionSpace {
        self.env.action_space()
    }

    fn close(&mut self) -> Result<()> {
        self.env.close()
    }
}
