use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};
use std::fs;
use std::path::Path;
use bincode::{serialize, deserialize};

use crate::activations::Activation;
use crate::agent::QFunction;
use crate::error::{DqnError, Result};
use crate::layers::{DenseLayer, LayerTrait, WeightInit};
use crate::optimizer::{Optimizer, OptimizerWrapper};

/// Per-layer `(weight_gradients, bias_gradients)`, ordered input to output.
pub type Gradients = Vec<(Array2<f32>, Array1<f32>)>;

/// A feed-forward network of dense layers, with the optimizer that trains it.
///
/// Two forward paths exist. [`NeuralNetwork::forward_batch`] takes `&mut self`
/// and records the activations a later [`NeuralNetwork::backward`] needs.
/// [`NeuralNetwork::evaluate`] and [`NeuralNetwork::predict`] take `&self` and
/// record nothing, so they can never contribute to a gradient.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
    pub optimizer: OptimizerWrapper,
}

impl NeuralNetwork {
    /// Create a new neural network with the given layer sizes, activations and optimizer.
    /// `activations` holds one entry per layer, i.e. `layer_sizes.len() - 1`.
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activations: &[Activation],
        init: WeightInit,
        optimizer: OptimizerWrapper,
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(DqnError::invalid_parameter(
                "layer_sizes",
                "must contain at least an input and an output size",
            ));
        }
        if layer_sizes.iter().any(|&size| size == 0) {
            return Err(DqnError::invalid_parameter("layer_sizes", "every layer needs at least one unit"));
        }
        if activations.len() != layer_sizes.len() - 1 {
            return Err(DqnError::dimension_mismatch(
                format!("{} activations", layer_sizes.len() - 1),
                format!("{} activations", activations.len()),
            ));
        }

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| DenseLayer::new(window[0], window[1], activation, init, rng))
            .collect();

        Ok(NeuralNetwork { layers, optimizer })
    }

    /// Build an action-value network: `hidden_activation` on every hidden
    /// layer and a linear output with one unit per action, initialised with
    /// [`WeightInit::FanInUniform`].
    pub fn q_network<R: Rng + ?Sized>(
        state_size: usize,
        hidden_sizes: &[usize],
        hidden_activation: Activation,
        num_actions: usize,
        optimizer: OptimizerWrapper,
        rng: &mut R,
    ) -> Result<Self> {
        Self::q_network_with_init(
            state_size,
            hidden_sizes,
            hidden_activation,
            num_actions,
            WeightInit::FanInUniform,
            optimizer,
            rng,
        )
    }

    /// [`NeuralNetwork::q_network`] with an explicit initialisation scheme
    pub fn q_network_with_init<R: Rng + ?Sized>(
        state_size: usize,
        hidden_sizes: &[usize],
        hidden_activation: Activation,
        num_actions: usize,
        init: WeightInit,
        optimizer: OptimizerWrapper,
        rng: &mut R,
    ) -> Result<Self> {
        let mut layer_sizes = Vec::with_capacity(hidden_sizes.len() + 2);
        layer_sizes.push(state_size);
        layer_sizes.extend_from_slice(hidden_sizes);
        layer_sizes.push(num_actions);

        let mut activations = vec![hidden_activation; hidden_sizes.len()];
        activations.push(Activation::Linear);

        Self::new(&layer_sizes, &activations, init, optimizer, rng)
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |layer| layer.input_size())
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |layer| layer.output_size())
    }

    fn check_input(&self, inputs: &ArrayView2<f32>) -> Result<()> {
        if inputs.ncols() != self.input_size() {
            return Err(DqnError::dimension_mismatch(
                format!("{} input features", self.input_size()),
                format!("{} input features", inputs.ncols()),
            ));
        }
        Ok(())
    }

    /// Forward pass for a batch that records activations for backprop.
    pub fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(&inputs)?;
        let mut current_output = inputs.to_owned();
        for layer in &mut self.layers {
            current_output = layer.forward_batch(current_output.view());
        }
        Ok(current_output)
    }

    /// Detached forward pass for a batch.
    pub fn evaluate(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(&inputs)?;
        let mut current_output = inputs.to_owned();
        for layer in &self.layers {
            current_output = layer.infer_batch(current_output.view());
        }
        Ok(current_output)
    }

    /// Detached forward pass for a single input vector.
    pub fn predict(&self, input: ArrayView1<f32>) -> Result<Array1<f32>> {
        let output = self.evaluate(input.insert_axis(Axis(0)))?;
        Ok(output.index_axis_move(Axis(0), 0))
    }

    /// Backpropagate `output_errors` (dLoss/dOutput for the last recorded
    /// batch) and return the per-layer gradients.
    pub fn backward(&self, output_errors: ArrayView2<f32>) -> Result<Gradients> {
        let mut gradients = Vec::with_capacity(self.layers.len());
        let mut current_error = output_errors.to_owned();

        for layer in self.layers.iter().rev() {
            let (input_error, weight_gradients, bias_gradients) = layer.backward_batch(current_error.view())?;
            gradients.push((weight_gradients, bias_gradients));
            current_error = input_error;
        }

        gradients.reverse();
        Ok(gradients)
    }

    /// Apply one optimisation step with the given gradients.
    pub fn apply_gradients(&mut self, gradients: &Gradients, learning_rate: f32) -> Result<()> {
        if gradients.len() != self.layers.len() {
            return Err(DqnError::dimension_mismatch(
                format!("{} layer gradients", self.layers.len()),
                format!("{} layer gradients", gradients.len()),
            ));
        }
        for (index, (layer, (weight_gradients, bias_gradients))) in self.layers.iter_mut().zip(gradients).enumerate() {
            self.optimizer.update_weights(index, layer.weights_mut(), weight_gradients, learning_rate);
            self.optimizer.update_biases(index, layer.biases_mut(), bias_gradients, learning_rate);
        }
        self.optimizer.finish_step();
        Ok(())
    }

    /// Overwrite every parameter with an exact copy of `other`'s.
    ///
    /// The copy is element-wise, so both networks produce bit-identical
    /// outputs afterwards. Optimizer state is left untouched.
    pub fn synchronize_from(&mut self, other: &NeuralNetwork) -> Result<()> {
        if !self.same_shape(other) {
            return Err(DqnError::dimension_mismatch(
                format!("{:?}", self.shape()),
                format!("{:?}", other.shape()),
            ));
        }
        for (mine, theirs) in self.layers.iter_mut().zip(&other.layers) {
            mine.weights.assign(&theirs.weights);
            mine.biases.assign(&theirs.biases);
            mine.activation = theirs.activation;
        }
        Ok(())
    }

    /// True when every weight and bias matches `other` bit for bit.
    pub fn parameters_equal(&self, other: &NeuralNetwork) -> bool {
        self.same_shape(other)
            && self.layers.iter().zip(&other.layers).all(|(a, b)| {
                a.weights.iter().zip(b.weights.iter()).all(|(x, y)| x.to_bits() == y.to_bits())
                    && a.biases.iter().zip(b.biases.iter()).all(|(x, y)| x.to_bits() == y.to_bits())
            })
    }

    fn shape(&self) -> Vec<(usize, usize)> {
        self.layers.iter().map(|layer| layer.weights.dim()).collect()
    }

    fn same_shape(&self, other: &NeuralNetwork) -> bool {
        self.shape() == other.shape()
    }

    /// Save the network (layers and optimizer state) to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serialize(self)?;
        fs::write(path, serialized)?;
        Ok(())
    }

    /// Load a network previously written by [`NeuralNetwork::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        let network: Self = deserialize(&data)?;
        Ok(network)
    }
}

impl QFunction for NeuralNetwork {
    fn num_actions(&self) -> usize {
        self.output_size()
    }

    fn action_values_batch(&self, states: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.evaluate(states)
    }
}
