//! # Agent
//!
//! The value-based learner: an action-value approximator abstraction
//! ([`QFunction`]), epsilon-greedy action selection ([`select_action`]) and
//! the DQN update with a target network ([`DqnAgent`]).
//!
//! ## Core Concepts
//!
//! - **Online network**: trained by gradient descent on every update
//! - **Target network**: a periodically synchronized copy used for Bellman targets
//! - **Exploration vs Exploitation**: random actions with probability epsilon,
//!   greedy actions otherwise

pub mod traits;
pub mod policy;

mod dqn;

pub use dqn::{bellman_targets, gather, DqnAgent};
pub use policy::select_action;
pub use traits::{argmax, max_per_row, QFunction};
