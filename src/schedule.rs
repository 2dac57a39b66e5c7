use serde::{Serialize, Deserialize};

use crate::error::{DqnError, Result};

/// Exponentially decaying exploration rate:
/// `epsilon = end + (start - end) * exp(-rate * step)`.
///
/// Evaluated in `f64` so very large steps underflow cleanly to `end`.
pub fn decay(start: f32, end: f32, rate: f32, step: u64) -> f32 {
    let (start, end, rate) = (start as f64, end as f64, rate as f64);
    (end + (start - end) * (-rate * step as f64).exp()) as f32
}

/// Exploration schedule driven by the global step counter
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpsilonSchedule {
    pub start: f32,
    pub end: f32,
    pub rate: f32,
}

impl EpsilonSchedule {
    pub fn new(start: f32, end: f32, rate: f32) -> Result<Self> {
        let schedule = EpsilonSchedule { start, end, rate };
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("epsilon_start", self.start), ("epsilon_end", self.end)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DqnError::invalid_parameter(name.to_string(), format!("{} is outside [0, 1]", value)));
            }
        }
        if self.start < self.end {
            return Err(DqnError::invalid_parameter("epsilon_start", "must not be below epsilon_end"));
        }
        if !(self.rate >= 0.0 && self.rate.is_finite()) {
            return Err(DqnError::invalid_parameter("epsilon_rate", "must be a finite non-negative number"));
        }
        Ok(())
    }

    /// Epsilon at the given step
    pub fn value(&self, step: u64) -> f32 {
        decay(self.start, self.end, self.rate, step)
    }
}

impl Default for EpsilonSchedule {
    fn default() -> Self {
        EpsilonSchedule {
            start: 1.0,
            end: 0.001,
            rate: 0.003,
        }
    }
}
