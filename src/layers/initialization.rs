use ndarray::{Array1, Array2};
use ndarray_rand::RandomExt;
use rand_distr::Uniform;
use rand::Rng;
use serde::{Serialize, Deserialize};

/// Weight initialization strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeightInit {
    /// U(-1/sqrt(fan_in), 1/sqrt(fan_in)) for weights and biases alike
    #[default]
    FanInUniform,

    /// Xavier/Glorot uniform initialization, zero biases
    XavierUniform,

    /// He/Kaiming uniform initialization (for ReLU), zero biases
    HeUniform,
}

impl WeightInit {
    /// Initialize a `(fan_in, fan_out)` weight matrix
    pub fn initialize_weights<R: Rng + ?Sized>(&self, shape: (usize, usize), rng: &mut R) -> Array2<f32> {
        let (fan_in, fan_out) = shape;
        let limit = match self {
            WeightInit::FanInUniform => 1.0 / (fan_in as f32).sqrt(),
            WeightInit::XavierUniform => (6.0 / (fan_in + fan_out) as f32).sqrt(),
            WeightInit::HeUniform => (6.0 / fan_in as f32).sqrt(),
        };
        Array2::random_using(shape, Uniform::new_inclusive(-limit, limit), rng)
    }

    /// Initialize the bias vector of a layer with `fan_in` inputs
    pub fn initialize_biases<R: Rng + ?Sized>(&self, fan_in: usize, size: usize, rng: &mut R) -> Array1<f32> {
        match self {
            WeightInit::FanInUniform => {
                let limit = 1.0 / (fan_in as f32).sqrt();
                Array1::random_using(size, Uniform::new_inclusive(-limit, limit), rng)
            }
            WeightInit::XavierUniform | WeightInit::HeUniform => Array1::zeros(size),
        }
    }
}
