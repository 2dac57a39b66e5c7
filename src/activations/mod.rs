//! # Activation Functions
//!
//! Element-wise non-linearities for dense layers. The Q-network uses `Tanh`
//! on its hidden layer and `Linear` on the output, so action-values are
//! unbounded.
//!
//! ```rust
//! use cartpole_dqn::activations::Activation;
//! use ndarray::array;
//!
//! let mut data = array![[1.0, -0.5], [0.0, 2.0]];
//! Activation::Relu.apply_batch(&mut data);
//! assert_eq!(data, array![[1.0, 0.0], [0.0, 2.0]]);
//! ```

pub mod functions;

pub use functions::Activation;
