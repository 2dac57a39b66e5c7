pub mod tracker;

pub use tracker::{EpisodeWindow, MetricsTracker, TrainingMetrics};
