//! Regression losses for the temporal-difference update.
//!
//! Losses operate on the gathered prediction vector (one Q-value per sampled
//! transition) against the Bellman targets, mean-reduced over the batch.

pub mod functions;

pub use functions::{HuberLoss, Loss, LossKind, MeanSquaredError};
