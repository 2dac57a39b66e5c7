//! # Environments
//!
//! The boundary between the learner and the simulated task. An environment
//! exposes `reset`, `step` and a discrete action space; its dynamics are its
//! own business. [`CartPole`] is the pole-balancing task the trainer targets.

pub mod cartpole;

use ndarray::Array1;
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::Result;

pub use cartpole::{CartPole, CartPoleConfig};

/// Free-form diagnostics returned alongside observations
pub type StepInfo = serde_json::Map<String, serde_json::Value>;

/// Result of a single environment step
#[derive(Debug, Clone)]
pub struct Step {
    pub next_state: Array1<f32>,
    pub reward: f32,
    /// The episode reached a terminal state
    pub terminated: bool,
    /// The episode was cut short (e.g. time limit)
    pub truncated: bool,
    pub info: StepInfo,
}

impl Step {
    /// Terminated or truncated
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// A finite action set `{0, .., n - 1}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscreteSpace {
    pub n: usize,
}

impl DiscreteSpace {
    pub fn new(n: usize) -> Self {
        DiscreteSpace { n }
    }

    /// Uniformly random action
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(0..self.n)
    }

    pub fn contains(&self, action: usize) -> bool {
        action < self.n
    }
}

/// Core environment trait
pub trait Environment {
    /// Length of every state vector
    fn observation_size(&self) -> usize;

    fn action_space(&self) -> DiscreteSpace;

    /// Start a new episode
    fn reset(&mut self) -> Result<(Array1<f32>, StepInfo)>;

    /// Apply an action to the current episode
    fn step(&mut self, action: usize) -> Result<Step>;

    /// Text frame of the current state, if the environment can draw itself
    fn render(&self) -> Option<String> {
        None
    }
}
