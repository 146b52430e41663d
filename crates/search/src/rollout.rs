//! Rollout execution against a fresh environment.

use brute_core::{Action, Environment, EnvironmentFactory, Result};

/// The actually-executed prefix of a candidate sequence and the reward it earned.
#[derive(Clone, Debug, PartialEq)]
pub struct Rollout {
    /// Actions applied before termination or exhaustion.
    pub actions: Vec<Action>,

    /// Sum of rewards over the executed actions.
    pub reward: f64,
}

impl Rollout {
    /// Number of environment steps taken.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Drive one fresh environment through `candidate`.
///
/// Resets a new instance, then applies each action in order until the
/// environment reports termination or the candidate is exhausted. The
/// environment is closed before returning, on success or failure.
pub fn execute<F: EnvironmentFactory>(factory: &F, candidate: &[Action]) -> Result<Rollout> {
    let mut env = factory.make()?;
    let played = play(&mut env, candidate);
    let closed = env.close();
    let rollout = played?;
    closed?;
    Ok(rollout)
}

fn play<E: Environment>(env: &mut E, candidate: &[Action]) -> Result<Rollout> {
    env.reset()?;
    let mut reward = 0.0;
    let mut steps = 0;

    for &action in candidate {
        let step = env.step(action)?;
        steps += 1;
        reward += step.reward;
        if step.done {
            break;
        }
    }

    Ok(Rollout {
        actions: candidate[..steps].to_vec(),
        reward,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::EarlyExit;
    use brute_core::{ActionSpace, BruteError, Step};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_execute_stops_on_done() {
        let rollout = execute(&EarlyExit::make, &[0, 1, 0, 0]).unwrap();
        assert_eq!(rollout.actions, vec![0, 1]);
        assert_eq!(rollout.reward, 1.0);
    }

    #[test]
    fn test_execute_full_episode() {
        let rollout = execute(&EarlyExit::make, &[0, 0, 0, 1, 1]).unwrap();
        assert_eq!(rollout.actions, vec![0, 0, 0]);
        assert_eq!(rollout.reward, 3.0);
        assert_eq!(rollout.len(), 3);
    }

    #[test]
    fn test_execute_exhausts_candidate() {
        let rollout = execute(&EarlyExit::make, &[0, 0]).unwrap();
        assert_eq!(rollout.actions, vec![0, 0]);
        assert_eq!(rollout.reward, 2.0);
    }

    #[test]
    fn test_execute_empty_candidate() {
        let rollout = execute(&EarlyExit::make, &[]).unwrap();
        assert!(rollout.is_empty());
        assert_eq!(rollout.reward, 0.0);
    }

    #[test]
    fn test_execute_replay_identical() {
        let candidate = [0, 0, 1];
        let first = execute(&EarlyExit::make, &candidate).unwrap();
        let second = execute(&EarlyExit::make, &candidate).unwrap();
        assert_eq!(first, second);
    }

    /// Fails on its second step; counts closes.
    struct Faulty<'a> {
        t: usize,
        closes: &'a AtomicUsize,
    }

    impl Environment for Faulty<'_> {
        type Observation = ();

        fn reset(&mut self) -> Result<()> {
            self.t = 0;
            Ok(())
        }

        fn step(&mut self, _action: Action) -> Result<Step<()>> {
            self.t += 1;
            if self.t > 1 {
                return Err(BruteError::Environment("emulator crashed".to_string()));
            }
            Ok(Step::new((), 1.0, false))
        }

        fn action_space(&self) -> ActionSpace {
            ActionSpace::new(1).unwrap()
        }

        fn close(&mut self) -> Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FaultyFactory<'a>(&'a AtomicUsize);

    impl<'a> EnvironmentFactory for FaultyFactory<'a> {
        type Env = Faulty<'a>;

        fn make(&self) -> Result<Faulty<'a>> {
            Ok(Faulty { t: 0, closes: self.0 })
        }
    }

    #[test]
    fn test_execute_surfaces_env_error_and_closes() {
        let closes = AtomicUsize::new(0);
        let factory = FaultyFactory(&closes);

        let result = execute(&factory, &[0, 0, 0]);
        assert!(matches!(result, Err(BruteError::Environment(_))));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }
}
