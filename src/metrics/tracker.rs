use std::collections::VecDeque;
use std::path::Path;
use serde::{Serialize, Deserialize};

/// Sliding window over the most recent episode lengths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeWindow {
    lengths: VecDeque<usize>,
    size: usize,
}

impl EpisodeWindow {
    pub fn new(size: usize) -> Self {
        EpisodeWindow {
            lengths: VecDeque::with_capacity(size),
            size,
        }
    }

    /// Record an episode length, evicting the oldest once the window is full
    pub fn push(&mut self, length: usize) {
        if self.lengths.len() >= self.size {
            self.lengths.pop_front();
        }
        self.lengths.push_back(length);
    }

    /// Mean over the lengths currently held, `None` before the first episode
    pub fn average(&self) -> Option<f32> {
        if self.lengths.is_empty() {
            return None;
        }
        let sum: usize = self.lengths.iter().sum();
        Some(sum as f32 / self.lengths.len() as f32)
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.lengths.len() == self.size
    }

    pub fn lengths(&self) -> impl Iterator<Item = &usize> {
        self.lengths.iter()
    }
}

/// Stores training metrics over a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Steps taken in each finished episode
    pub episode_lengths: Vec<usize>,

    /// Rolling average after each finished episode
    pub rolling_averages: Vec<f32>,

    /// Epsilon at the end of each finished episode
    pub epsilons: Vec<f32>,

    /// Mean TD loss over each finished episode's updates
    pub episode_losses: Vec<Option<f32>>,
}

/// Tracks metrics during training
#[derive(Debug, Default)]
pub struct MetricsTracker {
    metrics: TrainingMetrics,

    // Episode tracking
    loss_sum: f64,
    loss_count: usize,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a training loss for the current episode
    pub fn record_loss(&mut self, loss: f32) {
        self.loss_sum += loss as f64;
        self.loss_count += 1;
    }

    /// Close the current episode
    pub fn end_episode(&mut self, length: usize, rolling_average: f32, epsilon: f32) {
        self.metrics.episode_lengths.push(length);
        self.metrics.rolling_averages.push(rolling_average);
        self.metrics.epsilons.push(epsilon);
        let mean_loss = (self.loss_count > 0).then(|| (self.loss_sum / self.loss_count as f64) as f32);
        self.metrics.episode_losses.push(mean_loss);

        self.loss_sum = 0.0;
        self.loss_count = 0;
    }

    /// Mean loss of the episode in progress
    pub fn current_episode_loss(&self) -> Option<f32> {
        (self.loss_count > 0).then(|| (self.loss_sum / self.loss_count as f64) as f32)
    }

    /// Get a reference to the metrics
    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    pub fn episode_count(&self) -> usize {
        self.metrics.episode_lengths.len()
    }

    /// Save metrics to file as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::error::Result<()> {
        let serialized = serde_json::to_string_pretty(&self.metrics)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }
}
