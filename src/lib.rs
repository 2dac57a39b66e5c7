//! # cartpole-dqn - Deep Q-Learning for pole balancing
//!
//! A single, fixed DQN instance that learns to balance a pole on a cart. The
//! learner combines an exponentially decaying epsilon-greedy policy, a
//! bounded experience-replay buffer, an online/target network pair and a
//! smooth-L1 temporal-difference loss trained with Adam.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cartpole_dqn::config::TrainerConfig;
//! use cartpole_dqn::env::CartPole;
//! use cartpole_dqn::trainer::{Trainer, TrainingOutcome};
//!
//! let config = TrainerConfig { seed: 42, ..TrainerConfig::default() };
//! let mut trainer = Trainer::new(config, CartPole::new(42)).unwrap();
//!
//! if let TrainingOutcome::Converged { .. } = trainer.train().unwrap() {
//!     // Greedy rollouts with learning switched off
//!     let summary = trainer.evaluate(Some(3), |_, _| {}).unwrap();
//!     println!("{:?}", summary.lengths);
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Activation functions for dense layers
//! - [`agent`] - Q-function trait, epsilon-greedy policy and the DQN update
//! - [`config`] - Run hyperparameters and JSON loading
//! - [`env`] - Environment trait and the CartPole task
//! - [`error`] - Error types and result handling
//! - [`layers`] - Dense layers and weight initialisation
//! - [`loss`] - Huber and squared-error losses
//! - [`metrics`] - Episode window and run history
//! - [`network`] - Feed-forward network with detached and recording passes
//! - [`optimizer`] - SGD and Adam
//! - [`replay_buffer`] - Experience replay
//! - [`schedule`] - Exploration schedule
//! - [`trainer`] - The control loop

pub mod activations;
pub mod agent;
pub mod config;
pub mod env;
pub mod error;
pub mod layers;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod replay_buffer;
pub mod schedule;
pub mod trainer;

pub use error::{DqnError, Result};

#[cfg(test)]
mod tests;
