//! A side-scrolling runner over a seeded track.
//!
//! The track is a row of tiles generated once from a seed, so every reset
//! replays the same level. The agent advances left to right:
//!
//! ```text
//! tile:    _  _  o  _  v  _  ^  _  _ ... |
//! action:  run / jump / duck / wait
//! ```
//!
//! - `_` ground, `o` coin (bonus on landing), `v` pit (fall unless jumped),
//!   `^` beam (hit unless ducked under; cannot be jumped).
//! - Reward is +1 per column advanced, plus coin and finish bonuses.
//! - Touching a hazard ends the episode.

use brute_core::{Action, ActionSpace, BruteError, Environment, Result, Step};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt;

/// Default number of columns on a generated track.
pub const DEFAULT_LENGTH: usize = 256;

/// Bonus for landing on a coin.
pub const COIN_BONUS: f64 = 5.0;

/// Bonus for reaching the last column.
pub const FINISH_BONUS: f64 = 10.0;

const ACTIONS: ActionSpace = ActionSpace::fixed(4);

/// One column of the track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Ground,
    Coin,
    Pit,
    Beam,
}

impl Tile {
    fn is_hazard(self) -> bool {
        matches!(self, Tile::Pit | Tile::Beam)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tile::Ground => write!(f, "_"),
            Tile::Coin => write!(f, "o"),
            Tile::Pit => write!(f, "v"),
            Tile::Beam => write!(f, "^"),
        }
    }
}

/// Runner moves, indexed by action id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunnerAction {
    /// Advance one column.
    Run,
    /// Advance two columns, clearing a pit (but not a beam) in between.
    Jump,
    /// Advance one column, passing under a beam.
    Duck,
    /// Stay in place.
    Wait,
}

impl RunnerAction {
    pub const ALL: [RunnerAction; 4] = [
        RunnerAction::Run,
        RunnerAction::Jump,
        RunnerAction::Duck,
        RunnerAction::Wait,
    ];

    pub fn from_index(index: Action) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> Action {
        self as Action
    }
}

/// Position reported as the runner's observation.
pub type Position = usize;

#[derive(Clone, Debug)]
pub struct Runner {
    track: Vec<Tile>,
    position: Position,
    done: bool,
}

impl Runner {
    /// Generate the level for `seed` with `length` columns (at least 2).
    ///
    /// Hazards never appear back to back, and the first two columns and the
    /// last column are always ground, so every level can be finished.
    pub fn new(seed: u64, length: usize) -> Self {
        let length = length.max(2);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut track = Vec::with_capacity(length);

        for column in 0..length {
            let previous = track.last().copied().unwrap_or(Tile::Ground);
            let tile = if column < 2 || column + 1 == length || previous.is_hazard() {
                Tile::Ground
            } else {
                match rng.gen_range(0..10) {
                    0 | 1 => Tile::Pit,
                    2 => Tile::Beam,
                    3 => Tile::Coin,
                    _ => Tile::Ground,
                }
            };
            track.push(tile);
        }

        Self {
            track,
            position: 0,
            done: false,
        }
    }

    pub fn track(&self) -> &[Tile] {
        &self.track
    }

    pub fn position(&self) -> Position {
        self.position
    }

    fn finish(&self) -> Position {
        self.track.len() - 1
    }

    /// Columns entered by `action` from the current position, and whether it survives them.
    fn advance(&self, action: RunnerAction) -> (Position, bool) {
        let at = |offset: usize| {
            self.track
                .get(self.position + offset)
                .copied()
                .unwrap_or(Tile::Ground)
        };
        match action {
            RunnerAction::Wait => (self.position, true),
            RunnerAction::Run => (self.position + 1, !at(1).is_hazard()),
            RunnerAction::Duck => (self.position + 1, at(1) != Tile::Pit),
            RunnerAction::Jump => {
                let survives = at(1) != Tile::Beam && !at(2).is_hazard();
                (self.position + 2, survives)
            }
        }
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(0, DEFAULT_LENGTH)
    }
}

impl Environment for Runner {
    type Observation = Position;

    fn reset(&mut self) -> Result<Position> {
        self.position = 0;
        self.done = false;
        Ok(self.position)
    }

    fn step(&mut self, action: Action) -> Result<Step<Position>> {
        let action = RunnerAction::from_index(action).ok_or(BruteError::InvalidAction {
            action,
            n: ACTIONS.n(),
        })?;
        if self.done {
            return Err(BruteError::Environment(
                "step called after episode end".to_string(),
            ));
        }

        let (target, survives) = self.advance(action);
        let target = target.min(self.finish());
        let mut reward = (target - self.position) as f64;
        self.position = target;

        if !survives {
            self.done = true;
            return Ok(Step::new(self.position, reward, true));
        }
        if action != RunnerAction::Wait && self.track[target] == Tile::Coin {
            reward += COIN_BONUS;
        }
        if target == self.finish() {
            reward += FINISH_BONUS;
            self.done = true;
        }
        Ok(Step::new(self.position, reward, self.done))
    }

    fn action_space(&self) -> ActionSpace {
        ACTIONS
    }
}

impl fmt::Display for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tile in &self.track {
            write!(f, "{}", tile)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(track: &str) -> Runner {
        let track = track
            .chars()
            .map(|c| match c {
                'o' => Tile::Coin,
                'v' => Tile::Pit,
                '^' => Tile::Beam,
                _ => Tile::Ground,
            })
            .collect();
        Runner {
            track,
            position: 0,
            done: false,
        }
    }

    fn idx(action: RunnerAction) -> Action {
        action.index()
    }

    #[test]
    fn test_generation_deterministic() {
        let a = Runner::new(7, 64);
        let b = Runner::new(7, 64);
        assert_eq!(a.track(), b.track());
        assert_ne!(Runner::new(7, 64).track(), Runner::new(8, 64).track());
    }

    #[test]
    fn test_generation_solvable() {
        for seed in 0..20 {
            let env = Runner::new(seed, 128);
            let track = env.track();
            assert_eq!(track.len(), 128);
            assert_eq!(track[0], Tile::Ground);
            assert_eq!(track[1], Tile::Ground);
            assert_eq!(track[127], Tile::Ground);
            for pair in track.windows(2) {
                assert!(!(pair[0].is_hazard() && pair[1].is_hazard()));
            }
        }
    }

    #[test]
    fn test_run_into_pit_ends() {
        let mut env = runner("__v__");
        env.reset().unwrap();
        assert!(!env.step(idx(RunnerAction::Run)).unwrap().done);
        let step = env.step(idx(RunnerAction::Run)).unwrap();
        assert!(step.done);
        assert_eq!(step.reward, 1.0);
    }

    #[test]
    fn test_jump_clears_pit() {
        let mut env = runner("_v___");
        env.reset().unwrap();
        let step = env.step(idx(RunnerAction::Jump)).unwrap();
        assert!(!step.done);
        assert_eq!(step.observation, 2);
        assert_eq!(step.reward, 2.0);
    }

    #[test]
    fn test_jump_into_beam_ends() {
        let mut env = runner("_^___");
        env.reset().unwrap();
        assert!(env.step(idx(RunnerAction::Jump)).unwrap().done);
    }

    #[test]
    fn test_duck_under_beam() {
        let mut env = runner("_^___");
        env.reset().unwrap();
        let step = env.step(idx(RunnerAction::Duck)).unwrap();
        assert!(!step.done);
        assert_eq!(step.observation, 1);
    }

    #[test]
    fn test_coin_bonus_and_wait() {
        let mut env = runner("_o___");
        env.reset().unwrap();
        assert_eq!(env.step(idx(RunnerAction::Run)).unwrap().reward, 1.0 + COIN_BONUS);
        // Waiting on a coin does not collect it again
        assert_eq!(env.step(idx(RunnerAction::Wait)).unwrap().reward, 0.0);
    }

    #[test]
    fn test_finish_bonus() {
        let mut env = runner("___");
        env.reset().unwrap();
        let step = env.step(idx(RunnerAction::Jump)).unwrap();
        assert!(step.done);
        assert_eq!(step.reward, 2.0 + FINISH_BONUS);
    }

    #[test]
    fn test_jump_clamped_at_finish() {
        let mut env = runner("__");
        env.reset().unwrap();
        let step = env.step(idx(RunnerAction::Jump)).unwrap();
        assert_eq!(step.observation, 1);
        assert_eq!(step.reward, 1.0 + FINISH_BONUS);
    }

    #[test]
    fn test_invalid_action() {
        let mut env = Runner::default();
        env.reset().unwrap();
        assert!(matches!(
            env.step(4),
            Err(BruteError::InvalidAction { action: 4, n: 4 })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(runner("_ov^_").to_string(), "_ov^_");
    }
}
