//! Built-in deterministic environments.
//!
//! These stand in for an emulator and are used to validate the search:
//! replaying an action sequence from reset always reproduces the same rewards.

pub mod early_exit;
pub mod runner;

pub use early_exit::EarlyExit;
pub use runner::{Runner, RunnerAction, Tile};
