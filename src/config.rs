use serde::{Serialize, Deserialize};
use std::path::Path;

use crate::activations::Activation;
use crate::error::{DqnError, Result};
use crate::layers::WeightInit;
use crate::loss::LossKind;
use crate::optimizer::{Adam, OptimizerWrapper, SGD};
use crate::schedule::EpsilonSchedule;

/// Which update rule trains the online network
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    #[default]
    Adam,
    Sgd,
}

/// Hyperparameters of a training run, fixed at start-up.
///
/// Every field has a default, so a JSON config only needs the fields it
/// changes:
///
/// ```rust
/// use cartpole_dqn::config::TrainerConfig;
///
/// let config = TrainerConfig::from_json_str(r#"{ "batch_size": 64, "seed": 7 }"#).unwrap();
/// assert_eq!(config.batch_size, 64);
/// assert_eq!(config.replay_capacity, 50_000);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Seeds network initialisation, exploration and replay sampling
    pub seed: u64,
    pub replay_capacity: usize,
    pub batch_size: usize,
    /// Discount factor
    pub gamma: f32,
    pub epsilon: EpsilonSchedule,
    pub learning_rate: f32,
    /// Copy online -> target whenever the step counter is a multiple of this
    pub target_sync_interval: u64,
    pub max_episodes: usize,
    /// Episodes in the rolling average
    pub convergence_window: usize,
    /// Rolling average episode length that counts as solved
    pub convergence_threshold: f32,
    pub hidden_sizes: Vec<usize>,
    pub hidden_activation: Activation,
    pub weight_init: WeightInit,
    pub loss: LossKind,
    pub huber_delta: f32,
    pub optimizer: OptimizerKind,
    pub adam_beta1: f32,
    pub adam_beta2: f32,
    pub adam_epsilon: f32,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            seed: 0,
            replay_capacity: 50_000,
            batch_size: 32,
            gamma: 0.99,
            epsilon: EpsilonSchedule::default(),
            learning_rate: 5e-4,
            target_sync_interval: 1000,
            max_episodes: 1000,
            convergence_window: 5,
            convergence_threshold: 499.0,
            hidden_sizes: vec![64],
            hidden_activation: Activation::Tanh,
            weight_init: WeightInit::FanInUniform,
            loss: LossKind::Huber,
            huber_delta: 1.0,
            optimizer: OptimizerKind::Adam,
            adam_beta1: 0.9,
            adam_beta2: 0.999,
            adam_epsilon: 1e-8,
        }
    }
}

impl TrainerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TrainerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("replay_capacity", self.replay_capacity),
            ("batch_size", self.batch_size),
            ("max_episodes", self.max_episodes),
            ("convergence_window", self.convergence_window),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(DqnError::invalid_parameter(name, "must be greater than 0"));
            }
        }
        if self.target_sync_interval == 0 {
            return Err(DqnError::invalid_parameter("target_sync_interval", "must be greater than 0"));
        }
        if self.batch_size > self.replay_capacity {
            return Err(DqnError::invalid_parameter(
                "batch_size".to_string(),
                format!("{} exceeds replay_capacity {}", self.batch_size, self.replay_capacity),
            ));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(DqnError::invalid_parameter("gamma".to_string(), format!("{} is outside [0, 1]", self.gamma)));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(DqnError::invalid_parameter("learning_rate", "must be a finite positive number"));
        }
        if !(self.huber_delta > 0.0) {
            return Err(DqnError::invalid_parameter("huber_delta", "must be positive"));
        }
        for (name, beta) in [("adam_beta1", self.adam_beta1), ("adam_beta2", self.adam_beta2)] {
            if !(0.0..1.0).contains(&beta) {
                return Err(DqnError::invalid_parameter(name.to_string(), format!("{} is outside [0, 1)", beta)));
            }
        }
        if !(self.adam_epsilon > 0.0 && self.adam_epsilon.is_finite()) {
            return Err(DqnError::invalid_parameter("adam_epsilon", "must be a finite positive number"));
        }
        if self.hidden_sizes.iter().any(|&size| size == 0) {
            return Err(DqnError::invalid_parameter("hidden_sizes", "every hidden layer needs at least one unit"));
        }
        self.epsilon.validate()
    }

    /// Optimizer for the online network
    pub fn build_optimizer(&self) -> OptimizerWrapper {
        match self.optimizer {
            OptimizerKind::Adam => OptimizerWrapper::Adam(Adam::new(self.adam_beta1, self.adam_beta2, self.adam_epsilon)),
            OptimizerKind::Sgd => OptimizerWrapper::SGD(SGD::new()),
        }
    }
}
