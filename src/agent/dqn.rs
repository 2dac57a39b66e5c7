use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::Rng;

use crate::agent::policy::select_action;
use crate::agent::traits::{max_per_row, QFunction};
use crate::env::DiscreteSpace;
use crate::error::{DqnError, Result};
use crate::loss::Loss;
use crate::network::NeuralNetwork;
use crate::replay_buffer::Experience;

/// Deep Q-Network agent with a target network.
///
/// The online `q_network` is trained by gradient descent; the
/// `target_network` only changes through [`DqnAgent::update_target_network`],
/// which copies the online parameters exactly. Both start out identical.
///
/// # Example
///
/// ```rust
/// use cartpole_dqn::agent::DqnAgent;
/// use cartpole_dqn::activations::Activation;
/// use cartpole_dqn::loss::HuberLoss;
/// use cartpole_dqn::network::NeuralNetwork;
/// use cartpole_dqn::optimizer::{Adam, OptimizerWrapper};
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let optimizer = OptimizerWrapper::Adam(Adam::default());
/// let network = NeuralNetwork::q_network(4, &[64], Activation::Tanh, 2, optimizer, &mut rng).unwrap();
/// let agent = DqnAgent::new(network, 0.99, 5e-4, Box::new(HuberLoss::default()));
/// assert!(agent.q_network.parameters_equal(&agent.target_network));
/// ```
pub struct DqnAgent {
    /// Network trained on every update
    pub q_network: NeuralNetwork,

    /// Frozen copy used for Bellman targets
    pub target_network: NeuralNetwork,

    /// Discount factor
    pub gamma: f32,

    pub learning_rate: f32,

    loss: Box<dyn Loss>,

    /// Number of gradient updates applied
    pub train_steps: u64,
}

impl DqnAgent {
    pub fn new(q_network: NeuralNetwork, gamma: f32, learning_rate: f32, loss: Box<dyn Loss>) -> Self {
        let target_network = q_network.clone();
        DqnAgent {
            q_network,
            target_network,
            gamma,
            learning_rate,
            loss,
            train_steps: 0,
        }
    }

    /// Select an action with epsilon-greedy exploration over the online network
    pub fn act<R: Rng + ?Sized>(
        &self,
        state: ArrayView1<f32>,
        epsilon: f32,
        action_space: &DiscreteSpace,
        rng: &mut R,
    ) -> Result<usize> {
        select_action(state, epsilon, &self.q_network, action_space, rng)
    }

    /// Greedy action of the online network
    pub fn act_greedy(&self, state: ArrayView1<f32>) -> Result<usize> {
        self.q_network.act_greedy(state)
    }

    /// Copy the online parameters into the target network
    pub fn update_target_network(&mut self) -> Result<()> {
        self.target_network.synchronize_from(&self.q_network)
    }

    /// One temporal-difference update on a batch of experiences.
    ///
    /// Returns the loss measured before the parameter step. Non-finite
    /// targets or loss abort with [`DqnError::NumericalError`] and leave the
    /// online network unchanged.
    pub fn train_on_batch(&mut self, experiences: &[&Experience]) -> Result<f32> {
        if experiences.is_empty() {
            return Err(DqnError::InsufficientData { requested: 1, available: 0 });
        }

        let batch = Batch::stack(experiences, self.q_network.input_size())?;

        // Target network stays detached: evaluate() records nothing
        let next_q_values = self.target_network.action_values_batch(batch.next_states.view())?;
        let next_max = max_per_row(next_q_values.view())?;
        let targets = bellman_targets(batch.rewards.view(), batch.dones.view(), next_max.view(), self.gamma);
        if targets.iter().any(|t| !t.is_finite()) {
            return Err(DqnError::NumericalError("non-finite Bellman target".to_string()));
        }

        let q_values = self.q_network.forward_batch(batch.states.view())?;
        let predictions = gather(q_values.view(), &batch.actions)?;

        let loss = self.loss.compute(predictions.view(), targets.view());
        if !loss.is_finite() {
            return Err(DqnError::NumericalError(format!("non-finite loss {}", loss)));
        }

        // Only the taken action's output receives gradient
        let loss_gradient = self.loss.gradient(predictions.view(), targets.view());
        let mut output_errors = Array2::<f32>::zeros(q_values.dim());
        for (row, (&action, &grad)) in batch.actions.iter().zip(loss_gradient.iter()).enumerate() {
            output_errors[[row, action]] = grad;
        }

        let gradients = self.q_network.backward(output_errors.view())?;
        self.q_network.apply_gradients(&gradients, self.learning_rate)?;
        self.train_steps += 1;

        Ok(loss)
    }
}

/// A sampled batch split into column arrays
struct Batch {
    states: Array2<f32>,
    next_states: Array2<f32>,
    actions: Vec<usize>,
    rewards: Array1<f32>,
    dones: Array1<f32>,
}

impl Batch {
    fn stack(experiences: &[&Experience], state_size: usize) -> Result<Self> {
        let batch_size = experiences.len();
        let mut states = Array2::zeros((batch_size, state_size));
        let mut next_states = Array2::zeros((batch_size, state_size));
        let mut actions = Vec::with_capacity(batch_size);
        let mut rewards = Array1::zeros(batch_size);
        let mut dones = Array1::zeros(batch_size);

        for (i, exp) in experiences.iter().enumerate() {
            if exp.state.len() != state_size || exp.next_state.len() != state_size {
                return Err(DqnError::dimension_mismatch(
                    format!("state of length {}", state_size),
                    format!("state of length {} / next_state of length {}", exp.state.len(), exp.next_state.len()),
                ));
            }
            states.row_mut(i).assign(&exp.state);
            next_states.row_mut(i).assign(&exp.next_state);
            actions.push(exp.action);
            rewards[i] = exp.reward;
            dones[i] = if exp.done { 1.0 } else { 0.0 };
        }

        Ok(Batch { states, next_states, actions, rewards, dones })
    }
}

/// Bellman targets `r + gamma * (1 - done) * max_a' Q_target(s', a')`.
///
/// `dones` holds 1.0 for transitions that ended the episode, which masks the
/// continuation value to exactly zero.
pub fn bellman_targets(
    rewards: ArrayView1<f32>,
    dones: ArrayView1<f32>,
    next_max: ArrayView1<f32>,
    gamma: f32,
) -> Array1<f32> {
    let mut targets = rewards.to_owned();
    ndarray::Zip::from(&mut targets)
        .and(dones)
        .and(next_max)
        .for_each(|target, &done, &next| {
            if done == 0.0 {
                *target += gamma * next;
            }
        });
    targets
}

/// Pick `values[i, actions[i]]` for every row.
pub fn gather(values: ArrayView2<f32>, actions: &[usize]) -> Result<Array1<f32>> {
    if actions.len() != values.nrows() {
        return Err(DqnError::dimension_mismatch(
            format!("{} actions", values.nrows()),
            format!("{} actions", actions.len()),
        ));
    }
    let num_actions = values.ncols();
    actions
        .iter()
        .enumerate()
        .map(|(row, &action)| {
            if action >= num_actions {
                Err(DqnError::InvalidAction { action, num_actions })
            } else {
                Ok(values[[row, action]])
            }
        })
        .collect::<Result<Vec<f32>>>()
        .map(Array1::from)
}
