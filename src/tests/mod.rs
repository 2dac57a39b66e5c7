pub mod test_loss;
pub mod test_metrics;
pub mod test_schedule;
pub mod test_trainer;

use ndarray::Array1;
use crate::env::{DiscreteSpace, Environment, Step, StepInfo};
use crate::error::{DqnError, Result};

/// Reward 1 every step, terminal after exactly `horizon` steps
pub struct FixedHorizonEnv {
    pub horizon: usize,
    pub t: usize,
    pub resets: usize,
    pub fail_at: Option<usize>,
}

impl FixedHorizonEnv {
    pub fn new(horizon: usize) -> Self {
        FixedHorizonEnv { horizon, t: 0, resets: 0, fail_at: None }
    }

    fn observation(&self) -> Array1<f32> {
        let phase = self.t as f32 / self.horizon as f32;
        Array1::from(vec![phase, 1.0 - phase, (self.t % 2) as f32, 0.5])
    }
}

impl Environment for FixedHorizonEnv {
    fn observation_size(&self) -> usize {
        4
    }

    fn action_space(&self) -> DiscreteSpace {
        DiscreteSpace::new(2)
    }

    fn reset(&mut self) -> Result<(Array1<f32>, StepInfo)> {
        self.t = 0;
        self.resets += 1;
        Ok((self.observation(), StepInfo::new()))
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        if action >= 2 {
            return Err(DqnError::InvalidAction { action, num_actions: 2 });
        }
        self.t += 1;
        if self.fail_at == Some(self.t) {
            return Err(DqnError::Environment("simulator crashed".to_string()));
        }
        Ok(Step {
            next_state: self.observation(),
            reward: 1.0,
            terminated: self.t >= self.horizon,
            truncated: false,
            info: StepInfo::new(),
        })
    }
}
