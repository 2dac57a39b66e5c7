use ndarray::{Array1, ArrayView1};
use serde::{Serialize, Deserialize};

/// Trait defining the interface for loss functions
pub trait Loss: Send + Sync {
    /// Compute the mean loss between predictions and targets
    fn compute(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> f32;

    /// Compute the gradient of the mean loss with respect to predictions
    fn gradient(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> Array1<f32>;
}

/// Mean Squared Error loss
pub struct MeanSquaredError;

impl Loss for MeanSquaredError {
    fn compute(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> f32 {
        let diff = &predictions - &targets;
        (&diff * &diff).sum() / predictions.len() as f32
    }

    fn gradient(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> Array1<f32> {
        (&predictions - &targets) * (2.0 / predictions.len() as f32)
    }
}

/// Huber loss (smooth L1)
pub struct HuberLoss {
    pub delta: f32,
}

impl HuberLoss {
    pub fn new(delta: f32) -> Self {
        HuberLoss { delta }
    }
}

impl Default for HuberLoss {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Loss for HuberLoss {
    fn compute(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> f32 {
        let diff = &predictions - &targets;
        diff.mapv(|x| {
            let abs_x = x.abs();
            if abs_x < self.delta {
                0.5 * x * x / self.delta
            } else {
                abs_x - 0.5 * self.delta
            }
        }).sum() / predictions.len() as f32
    }

    fn gradient(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> Array1<f32> {
        let diff = &predictions - &targets;
        let n = predictions.len() as f32;
        diff.mapv(|x| {
            if x.abs() < self.delta {
                x / self.delta
            } else {
                x.signum()
            }
        }) / n
    }
}

/// Loss selection for the trainer config
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LossKind {
    #[default]
    Huber,
    Mse,
}

impl LossKind {
    pub fn build(self, huber_delta: f32) -> Box<dyn Loss> {
        match self {
            LossKind::Huber => Box::new(HuberLoss::new(huber_delta)),
            LossKind::Mse => Box::new(MeanSquaredError),
        }
    }
}
