use ndarray::Array1;
use rand::Rng;
use rand::seq::index;
use serde::{Serialize, Deserialize};
use std::collections::VecDeque;

use crate::error::{DqnError, Result};

/// One observed environment step
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub state: Array1<f32>,
    pub action: usize,
    pub reward: f32,
    pub next_state: Array1<f32>,
    /// Episode ended here (terminated or truncated)
    pub done: bool,
}

/// Shape every stored experience must have
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExperienceShape {
    pub state_size: usize,
    pub num_actions: usize,
}

/// Fixed-capacity FIFO store of experiences with uniform sampling.
///
/// Once full, each insertion evicts the oldest experience. When built
/// [`ReplayBuffer::with_shape`], malformed experiences are rejected on
/// insertion.
#[derive(Clone, Debug)]
pub struct ReplayBuffer {
    buffer: VecDeque<Experience>,
    capacity: usize,
    shape: Option<ExperienceShape>,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(DqnError::invalid_parameter("capacity", "Capacity must be greater than 0"));
        }
        Ok(ReplayBuffer {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            shape: None,
        })
    }

    /// Reject experiences whose states or action do not fit `shape`
    pub fn with_shape(mut self, state_size: usize, num_actions: usize) -> Self {
        self.shape = Some(ExperienceShape { state_size, num_actions });
        self
    }

    pub fn add(&mut self, experience: Experience) -> Result<()> {
        if let Some(shape) = self.shape {
            validate(&experience, shape)?;
        }
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(experience);
        Ok(())
    }

    /// Sample `batch_size` distinct experiences uniformly, without replacement.
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Result<Vec<&Experience>> {
        if batch_size > self.buffer.len() {
            return Err(DqnError::InsufficientData {
                requested: batch_size,
                available: self.buffer.len(),
            });
        }
        Ok(index::sample(rng, self.buffer.len(), batch_size)
            .into_iter()
            .map(|i| &self.buffer[i])
            .collect())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored experiences, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Experience> {
        self.buffer.iter()
    }
}

fn validate(experience: &Experience, shape: ExperienceShape) -> Result<()> {
    if experience.state.len() != shape.state_size {
        return Err(DqnError::dimension_mismatch(
            format!("state of length {}", shape.state_size),
            format!("state of length {}", experience.state.len()),
        ));
    }
    if experience.next_state.len() != shape.state_size {
        return Err(DqnError::dimension_mismatch(
            format!("next_state of length {}", shape.state_size),
            format!("next_state of length {}", experience.next_state.len()),
        ));
    }
    if experience.action >= shape.num_actions {
        return Err(DqnError::InvalidAction {
            action: experience.action,
            num_actions: shape.num_actions,
        });
    }
    Ok(())
}
