//! Recording of winning trajectories.
//!
//! A recording is made by replaying an action sequence against a fresh
//! environment between [`Recorder::begin`] and [`Recorder::stop`].
//! [`TrajectoryRecorder`] persists the replay as MessagePack.

use brute_core::{Action, BruteError, Environment, EnvironmentFactory, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// A single replayed step.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StepRecord {
    pub action: Action,
    pub reward: f64,
    pub done: bool,
}

/// A complete replayed trajectory.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TrajectoryRecord {
    /// Sequence of replayed steps.
    pub steps: Vec<StepRecord>,

    /// Total reward over the replay.
    pub reward: f64,

    /// Free-form metadata (environment name, seed, ...).
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Sink for replays of winning trajectories.
pub trait Recorder {
    /// Start a recording that will be persisted to `path`.
    fn begin(&mut self, path: &Path) -> Result<()>;

    /// Capture one replayed step.
    fn capture(&mut self, step: StepRecord) -> Result<()>;

    /// Finish and persist the current recording.
    fn stop(&mut self) -> Result<()>;

    /// Discard the current recording, if any.
    fn abort(&mut self) {}
}

/// Recorder that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRecorder;

impl Recorder for NullRecorder {
    fn begin(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn capture(&mut self, _step: StepRecord) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Persists each recording as a MessagePack [`TrajectoryRecord`].
#[derive(Debug, Default)]
pub struct TrajectoryRecorder {
    metadata: HashMap<String, serde_json::Value>,
    active: Option<(PathBuf, Vec<StepRecord>)>,
}

impl TrajectoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach metadata written into every recording.
    pub fn with_metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Read a recording back from disk.
    pub fn load(path: &Path) -> Result<TrajectoryRecord> {
        let file = File::open(path)?;
        rmp_serde::decode::from_read(file).map_err(|e| BruteError::Recorder(e.to_string()))
    }
}

impl Recorder for TrajectoryRecorder {
    fn begin(&mut self, path: &Path) -> Result<()> {
        if self.active.is_some() {
            return Err(BruteError::Recorder("recording already in progress".to_string()));
        }
        self.active = Some((path.to_path_buf(), Vec::new()));
        Ok(())
    }

    fn capture(&mut self, step: StepRecord) -> Result<()> {
        match &mut self.active {
            Some((_, steps)) => {
                steps.push(step);
                Ok(())
            }
            None => Err(BruteError::Recorder("capture without begin".to_string())),
        }
    }

    fn stop(&mut self) -> Result<()> {
        let (path, steps) = self
            .active
            .take()
            .ok_or_else(|| BruteError::Recorder("stop without begin".to_string()))?;

        let reward = steps.iter().map(|s| s.reward).sum();
        let mut metadata = self.metadata.clone();
        metadata.insert("steps".to_string(), serde_json::json!(steps.len()));
        let record = TrajectoryRecord {
            steps,
            reward,
            metadata,
        };

        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        // Use named fields to serialize structs as maps (not arrays)
        rmp_serde::encode::write_named(&mut writer, &record)
            .map_err(|e| BruteError::Recorder(e.to_string()))?;
        writer.flush()?;
        Ok(())
    }

    fn abort(&mut self) {
        self.active = None;
    }
}

/// Replay `actions` against a fresh environment while recording to `path`.
///
/// Stops at the first terminal step. Returns the replayed reward. On failure
/// the partial recording is discarded.
pub fn record_replay<F, R>(factory: &F, recorder: &mut R, path: &Path, actions: &[Action]) -> Result<f64>
where
    F: EnvironmentFactory,
    R: Recorder + ?Sized,
{
    recorder.begin(path)?;
    match replay(factory, recorder, actions) {
        Ok(reward) => {
            recorder.stop()?;
            Ok(reward)
        }
        Err(err) => {
            recorder.abort();
            Err(err)
        }
    }
}

fn replay<F, R>(factory: &F, recorder: &mut R, actions: &[Action]) -> Result<f64>
where
    F: EnvironmentFactory,
    R: Recorder + ?Sized,
{
    let mut env = factory.make()?;
    let played = capture_steps(&mut env, recorder, actions);
    let closed = env.close();
    let total = played?;
    closed?;
    Ok(total)
}

fn capture_steps<E, R>(env: &mut E, recorder: &mut R, actions: &[Action]) -> Result<f64>
where
    E: Environment,
    R: Recorder + ?Sized,
{
    env.reset()?;
    let mut total = 0.0;
    for &action in actions {
        let step = env.step(action)?;
        total += step.reward;
        recorder.capture(StepRecord {
            action,
            reward: step.reward,
            done: step.done,
        })?;
        if step.done {
            break;
        }
    }
    Ok(total)
}
