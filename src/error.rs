use thiserror::Error;

/// Result type for training operations
pub type Result<T> = std::result::Result<T, DqnError>;

/// Main error type for the DQN trainer
#[derive(Error, Debug)]
pub enum DqnError {
    /// Invalid dimensions for operations
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Action index outside the action set
    #[error("Invalid action {action}: must be less than {num_actions}")]
    InvalidAction {
        action: usize,
        num_actions: usize,
    },

    /// Sampling more transitions than the buffer holds
    #[error("Insufficient data: requested {requested} samples, buffer holds {available}")]
    InsufficientData {
        requested: usize,
        available: usize,
    },

    /// Numerical computation errors (NaN, infinity, empty reductions)
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// Failure reported by the environment collaborator
    #[error("Environment error: {0}")]
    Environment(String),

    /// Training was requested after the policy was frozen for evaluation
    #[error("Policy is frozen: training is disabled after convergence")]
    PolicyFrozen,

    /// IO errors (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary checkpoint (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// JSON config and metrics errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// Helper functions for common error patterns
impl DqnError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        DqnError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        DqnError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
