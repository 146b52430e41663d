//! The outer search loop.
//!
//! Runs rounds until the simulated-timestep budget is spent, recording every
//! new best trajectory along the way.

use crate::{
    config::DriverConfig,
    record::{record_replay, Recorder},
    search::Brute,
};
use brute_core::{Action, EnvironmentFactory, Result};
use log::{debug, info, warn};
use std::fmt;

/// Why the driver stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stop {
    /// Cumulative executed timesteps exceeded the configured budget.
    TimestepLimit,
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stop::TimestepLimit => write!(f, "timestep limit exceeded"),
        }
    }
}

/// Summary of a completed driver run.
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    /// Best round reward seen.
    pub best_reward: f64,

    /// Executed actions of the best round.
    pub best_actions: Vec<Action>,

    /// Sum of each round's winning sequence length.
    pub timesteps: u64,

    /// Rounds run.
    pub rounds: usize,

    /// Tree size at the end of the run.
    pub nodes: usize,

    /// Recordings that failed to persist.
    pub failed_recordings: usize,

    pub stop: Stop,
}

/// Repeatedly runs the Brute and records improvements.
pub struct Driver<F: EnvironmentFactory, R: Recorder> {
    brute: Brute<F>,
    recorder: R,
    config: DriverConfig,
}

impl<F: EnvironmentFactory, R: Recorder> Driver<F, R> {
    pub fn new(brute: Brute<F>, recorder: R, config: DriverConfig) -> Self {
        Self {
            brute,
            recorder,
            config,
        }
    }

    /// Run until the timestep budget is exceeded.
    ///
    /// Environment failures end the run with an error. Recorder failures are
    /// logged and the search continues.
    pub fn run(&mut self) -> Result<Outcome> {
        let mut best_reward = f64::NEG_INFINITY;
        let mut best_actions = Vec::new();
        let mut timesteps: u64 = 0;
        let mut rounds = 0;
        let mut failed_recordings = 0;

        let stop = loop {
            let round = self.brute.run()?;
            rounds += 1;
            timesteps += round.actions.len() as u64;

            if round.reward > best_reward {
                info!(
                    "new best reward {} => {} ({} actions, round {}, {} nodes)",
                    best_reward,
                    round.reward,
                    round.actions.len(),
                    rounds,
                    self.brute.node_count()
                );
                best_reward = round.reward;
                best_actions = round.actions;
                failed_recordings += usize::from(!self.record(&best_actions));
            }

            if timesteps > self.config.timestep_limit {
                break Stop::TimestepLimit;
            }
        };

        info!("{} after {} rounds ({} timesteps)", stop, rounds, timesteps);

        Ok(Outcome {
            best_reward,
            best_actions,
            timesteps,
            rounds,
            nodes: self.brute.node_count(),
            failed_recordings,
            stop,
        })
    }

    /// Record a replay of `actions`; returns whether it was persisted.
    fn record(&mut self, actions: &[Action]) -> bool {
        let path = &self.config.output;
        match record_replay(self.brute.factory(), &mut self.recorder, path, actions) {
            Ok(reward) => {
                debug!("recorded replay with reward {} to {:?}", reward, path);
                true
            }
            Err(err) => {
                warn!("failed to record best trajectory to {:?}: {}", path, err);
                false
            }
        }
    }

    pub fn brute(&self) -> &Brute<F> {
        &self.brute
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }
}
