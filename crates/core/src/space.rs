//! Discrete action spaces.

use crate::{Action, BruteError, Result};
use rand::Rng;

/// A discrete action space `[0, n)`.
///
/// Invariant: `n > 0`.
///
/// # Example
/// ```
/// use brute_core::ActionSpace;
///
/// let space = ActionSpace::new(4).unwrap();
/// assert_eq!(space.n(), 4);
/// assert!(space.contains(3));
/// assert!(!space.contains(4));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionSpace(usize);

impl ActionSpace {
    /// Create a new action space with `n` actions.
    ///
    /// # Errors
    /// Returns `BruteError::EmptyActionSpace` if `n` is zero.
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(BruteError::EmptyActionSpace);
        }
        Ok(Self(n))
    }

    /// Action space of a statically known size.
    ///
    /// Intended for `const` items, where `n == 0` is rejected at compile time.
    pub const fn fixed(n: usize) -> Self {
        assert!(n > 0, "action space must not be empty");
        Self(n)
    }

    /// Number of legal actions.
    pub fn n(self) -> usize {
        self.0
    }

    /// Sample a legal action uniformly at random.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> Action {
        rng.gen_range(0..self.0)
    }

    /// Whether `action` is legal in this space.
    pub fn contains(self, action: Action) -> bool {
        action < self.0
    }

    /// Check that `action` is legal, for environments validating their input.
    pub fn check(self, action: Action) -> Result<Action> {
        if self.contains(action) {
            Ok(action)
        } else {
            Err(BruteError::InvalidAction {
                action,
                n: self.0,
            })
        }
    }

    /// Iterate over every legal action in ascending order.
    pub fn iter(self) -> impl Iterator<Item = Action> {
        0..self.0
    }
}
