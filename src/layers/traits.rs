use ndarray::{Array1, Array2, ArrayView2};

/// Trait defining the interface for trainable network layers
pub trait Layer: Send + Sync {
    /// Forward propagation for a batch, caching what backprop needs
    fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Array2<f32>;

    /// Forward propagation for a batch without recording anything
    fn infer_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32>;

    /// Backward propagation for a batch of output errors.
    ///
    /// Returns `(input_error, weight_gradients, bias_gradients)`. Fails unless
    /// `forward_batch` ran first.
    fn backward_batch(&self, output_errors: ArrayView2<f32>) -> crate::error::Result<(Array2<f32>, Array2<f32>, Array1<f32>)>;

    /// Get mutable reference to weights
    fn weights_mut(&mut self) -> &mut Array2<f32>;

    /// Get mutable reference to biases
    fn biases_mut(&mut self) -> &mut Array1<f32>;

    /// Get reference to weights
    fn weights(&self) -> &Array2<f32>;

    /// Get reference to biases
    fn biases(&self) -> &Array1<f32>;

    /// Get the output size of the layer
    fn output_size(&self) -> usize;

    /// Get the input size of the layer
    fn input_size(&self) -> usize;
}
