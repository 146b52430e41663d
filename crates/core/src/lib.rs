//! Brute Core - environment abstractions and common types
//!
//! This crate provides the `Environment` trait that any deterministic,
//! replayable environment implements to be searched by the Brute, plus the
//! decorators that shape an environment before the search sees it.
//!
//! # Types
//!
//! - [`Environment`] - Trait for environment implementations
//! - [`EnvironmentFactory`] - Builds fresh environment instances
//! - [`ActionSpace`] - Discrete set of legal actions `[0, n)`
//! - [`Step`] - Outcome of a single environment step
//! - [`Frameskip`] / [`TimeLimit`] - Environment decorators

mod env;
mod error;
mod space;
pub mod wrappers;

pub use env::{Action, Environment, EnvironmentFactory, Info, Step};
pub use error::{BruteError, Result};
pub use space::ActionSpace;
pub use wrappers::{Frameskip, TimeLimit};
