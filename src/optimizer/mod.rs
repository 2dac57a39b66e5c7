use ndarray::{Array1, Array2, Zip};
use serde::{Serialize, Deserialize};

/// Parameter update rule applied layer by layer.
///
/// `layer` identifies which layer's parameters are being updated so that
/// stateful optimizers can keep per-layer statistics. `finish_step` is called
/// once after every layer has been updated for one optimisation step.
pub trait Optimizer {
    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32);
    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32);
    fn finish_step(&mut self) {}
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum OptimizerWrapper {
    SGD(SGD),
    Adam(Adam),
}

impl Optimizer for OptimizerWrapper {
    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update_weights(layer, weights, gradients, learning_rate),
            OptimizerWrapper::Adam(optimizer) => optimizer.update_weights(layer, weights, gradients, learning_rate),
        }
    }

    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.update_biases(layer, biases, gradients, learning_rate),
            OptimizerWrapper::Adam(optimizer) => optimizer.update_biases(layer, biases, gradients, learning_rate),
        }
    }

    fn finish_step(&mut self) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.finish_step(),
            OptimizerWrapper::Adam(optimizer) => optimizer.finish_step(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SGD;

impl SGD {
    pub fn new() -> SGD {
        SGD
    }
}

impl Default for SGD {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimizer for SGD {
    fn update_weights(&mut self, _layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        weights.zip_mut_with(gradients, |w, &g| *w -= learning_rate * g);
    }

    fn update_biases(&mut self, _layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        biases.zip_mut_with(gradients, |b, &g| *b -= learning_rate * g);
    }
}

/// Adam with bias-corrected first and second moment estimates.
///
/// Moment buffers are allocated the first time a layer index is seen, so the
/// optimizer can be built before the network it will train.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Adam {
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    m_weights: Vec<Option<Array2<f32>>>,
    v_weights: Vec<Option<Array2<f32>>>,
    m_biases: Vec<Option<Array1<f32>>>,
    v_biases: Vec<Option<Array1<f32>>>,
    pub t: usize,
}

impl Adam {
    pub fn new(beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Adam {
            beta1,
            beta2,
            epsilon,
            m_weights: Vec::new(),
            v_weights: Vec::new(),
            m_biases: Vec::new(),
            v_biases: Vec::new(),
            t: 1,
        }
    }

    fn bias_corrections(&self) -> (f32, f32) {
        let t = self.t as f32;
        (1.0 - self.beta1.powf(t), 1.0 - self.beta2.powf(t))
    }
}

impl Default for Adam {
    fn default() -> Self {
        Self::new(0.9, 0.999, 1e-8)
    }
}

fn slot<'a, T: Clone>(slots: &'a mut Vec<Option<T>>, index: usize, zeros: impl FnOnce() -> T) -> &'a mut T {
    if slots.len() <= index {
        slots.resize(index + 1, None);
    }
    slots[index].get_or_insert_with(zeros)
}

impl Optimizer for Adam {
    fn update_weights(&mut self, layer: usize, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);
        let (correction1, correction2) = self.bias_corrections();
        let dim = weights.dim();

        let m = slot(&mut self.m_weights, layer, || Array2::zeros(dim));
        let v = slot(&mut self.v_weights, layer, || Array2::zeros(dim));
        Zip::from(weights).and(gradients).and(m).and(v).for_each(|w, &g, m, v| {
            *m = beta1 * *m + (1.0 - beta1) * g;
            *v = beta2 * *v + (1.0 - beta2) * g * g;
            let m_hat = *m / correction1;
            let v_hat = *v / correction2;
            *w -= learning_rate * m_hat / (v_hat.sqrt() + epsilon);
        });
    }

    fn update_biases(&mut self, layer: usize, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);
        let (correction1, correction2) = self.bias_corrections();
        let len = biases.len();

        let m = slot(&mut self.m_biases, layer, || Array1::zeros(len));
        let v = slot(&mut self.v_biases, layer, || Array1::zeros(len));
        Zip::from(biases).and(gradients).and(m).and(v).for_each(|b, &g, m, v| {
            *m = beta1 * *m + (1.0 - beta1) * g;
            *v = beta2 * *v + (1.0 - beta2) * g * g;
            let m_hat = *m / correction1;
            let v_hat = *v / correction2;
            *b -= learning_rate * m_hat / (v_hat.sqrt() + epsilon);
        });
    }

    fn finish_step(&mut self) {
        self.t += 1;
    }
}
