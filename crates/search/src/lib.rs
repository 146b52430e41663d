//! Tree search over deterministic, replayable environments.
//!
//! This crate implements the "Brute": an agent that exploits determinism by
//! remembering which action sequences paid off. It never saves environment
//! state; it only relies on the same action sequence producing the same
//! result when replayed from reset.
//!
//! # Features
//!
//! - **Optimistic tree**: every node keeps the best reward of any rollout through it
//! - **Epsilon-greedy selection**: exploration decays as `c / ln(visits + 2)`
//! - **Parallel rounds**: rollouts sample a fixed tree on a rayon pool, then merge serially
//! - **Recording**: each new best trajectory is replayed and persisted as MessagePack
//!
//! # Example
//!
//! ```
//! use brute_core::Result;
//! use brute_search::{envs::EarlyExit, Brute, BruteConfig};
//!
//! let config = BruteConfig::with_episode_steps(3).workers(2).seed(42);
//! let mut brute = Brute::new(EarlyExit::make as fn() -> Result<EarlyExit>, config).unwrap();
//!
//! let round = brute.run().unwrap();
//! println!("Best reward: {}", round.reward);
//! println!("Tree size: {}", brute.node_count());
//! ```

pub mod config;
pub mod driver;
pub mod envs;
mod node;
pub mod record;
pub mod rollout;
pub mod search;
pub mod select;
mod tree;

pub use config::{BruteConfig, DriverConfig};
pub use driver::{Driver, Outcome, Stop};
pub use node::{Node, NodeId};
pub use record::{NullRecorder, Recorder, TrajectoryRecorder};
pub use rollout::{execute, Rollout};
pub use search::{Brute, Round};
pub use select::Selector;
pub use tree::Tree;
