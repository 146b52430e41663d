//! A two-action, three-step environment with a greedy trap.
//!
//! - Action 0 pays 1 and continues; the episode ends after three steps.
//! - Action 1 pays 5 on the first step and ends the episode. Taken later it
//!   pays nothing and ends the episode.
//!
//! The best trajectory is `[1]` for a reward of 5; steady play earns only 3.

use brute_core::{Action, ActionSpace, BruteError, Environment, Result, Step};

/// Episode length when only action 0 is played.
pub const HORIZON: usize = 3;

const ACTIONS: ActionSpace = ActionSpace::fixed(2);

#[derive(Clone, Debug, Default)]
pub struct EarlyExit {
    t: usize,
    done: bool,
}

impl EarlyExit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory function for use with [`brute_core::EnvironmentFactory`].
    pub fn make() -> Result<Self> {
        Ok(Self::new())
    }
}

impl Environment for EarlyExit {
    type Observation = usize;

    fn reset(&mut self) -> Result<usize> {
        self.t = 0;
        self.done = false;
        Ok(self.t)
    }

    fn step(&mut self, action: Action) -> Result<Step<usize>> {
        let action = self.action_space().check(action)?;
        if self.done {
            return Err(BruteError::Environment(
                "step called after episode end".to_string(),
            ));
        }

        let first = self.t == 0;
        self.t += 1;
        let (reward, done) = match action {
            0 => (1.0, self.t >= HORIZON),
            _ if first => (5.0, true),
            _ => (0.0, true),
        };
        self.done = done;
        Ok(Step::new(self.t, reward, done))
    }

    fn action_space(&self) -> ActionSpace {
        ACTIONS
    }
}
