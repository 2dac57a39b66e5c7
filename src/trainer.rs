//! # Trainer
//!
//! The control loop that turns environment interaction into a trained
//! Q-network. One [`Trainer::step`] runs the full per-step protocol:
//!
//! 1. increment the global step counter
//! 2. compute epsilon from the schedule at that step
//! 3. pick an action epsilon-greedily from the online network
//! 4. step the environment (`done = terminated || truncated`)
//! 5. store the transition in the replay buffer
//! 6. advance the current state
//! 7. run one TD update once the buffer holds a full batch
//! 8. copy online -> target when the counter hits the sync interval
//! 9. on `done`, record the episode length and test for convergence
//!
//! Convergence moves the trainer from [`Phase::Training`] to
//! [`Phase::Evaluating`] for good. An evaluating trainer only acts greedily;
//! every training entry point returns [`DqnError::PolicyFrozen`].

use ndarray::Array1;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, trace, warn};

use crate::agent::{DqnAgent, QFunction};
use crate::config::TrainerConfig;
use crate::env::{DiscreteSpace, Environment};
use crate::error::{DqnError, Result};
use crate::metrics::{EpisodeWindow, MetricsTracker};
use crate::network::NeuralNetwork;
use crate::replay_buffer::{Experience, ReplayBuffer};

/// Where the control loop is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Exploring and learning
    Training,
    /// Policy frozen, greedy actions only
    Evaluating,
}

/// All mutable training state, owned by the trainer
pub struct TrainerState {
    /// Environment interactions since the run started; never reset
    pub step_count: u64,
    pub buffer: ReplayBuffer,
    pub agent: DqnAgent,
    /// Recent episode lengths for the convergence test
    pub window: EpisodeWindow,
    pub phase: Phase,
    /// Scheduled online -> target copies performed
    pub target_syncs: u64,
    pub episodes_completed: usize,
}

/// What happened during one [`Trainer::step`]
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub action: usize,
    pub reward: f32,
    pub done: bool,
    pub epsilon: f32,
    /// Loss of the TD update, if one ran
    pub loss: Option<f32>,
    pub target_synced: bool,
    /// Set on the step that ended an episode
    pub episode: Option<EpisodeReport>,
}

/// Summary of a finished training episode
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeReport {
    /// Zero-based episode index
    pub episode: usize,
    /// Environment steps taken in the episode
    pub steps: usize,
    pub total_reward: f32,
    pub rolling_average: f32,
    pub epsilon: f32,
    pub mean_loss: Option<f32>,
    pub converged: bool,
}

/// How [`Trainer::train`] ended
#[derive(Debug, Clone, PartialEq)]
pub enum TrainingOutcome {
    /// Rolling average reached the threshold; the policy is now frozen
    Converged { episode: usize, average: f32 },
    /// Ran out of episodes first
    EpisodeCapReached { episodes: usize, last_average: f32 },
}

/// One greedy step taken while evaluating
#[derive(Debug, Clone)]
pub struct EvaluationStep {
    pub episode: usize,
    /// One-based step within the episode
    pub step: usize,
    pub action: usize,
    pub reward: f32,
    pub done: bool,
}

/// Totals of an evaluation run
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSummary {
    pub episodes: usize,
    pub total_steps: u64,
    /// Per-episode lengths, kept only when the run is bounded
    pub lengths: Vec<usize>,
    keep_lengths: bool,
}

impl EvaluationSummary {
    pub fn new(keep_lengths: bool) -> Self {
        EvaluationSummary {
            episodes: 0,
            total_steps: 0,
            lengths: Vec::new(),
            keep_lengths,
        }
    }

    pub fn record(&mut self, length: usize) {
        self.episodes += 1;
        self.total_steps += length as u64;
        if self.keep_lengths {
            self.lengths.push(length);
        }
    }

    /// Mean episode length, `None` before the first episode
    pub fn mean_length(&self) -> Option<f32> {
        (self.episodes > 0).then(|| self.total_steps as f32 / self.episodes as f32)
    }
}

#[derive(Debug, Default)]
struct EpisodeProgress {
    current_state: Option<Array1<f32>>,
    steps: usize,
    total_reward: f32,
}

/// Deep Q-learning control loop over an environment
pub struct Trainer<E: Environment> {
    config: TrainerConfig,
    env: E,
    action_space: DiscreteSpace,
    state: TrainerState,
    progress: EpisodeProgress,
    metrics: MetricsTracker,
    rng: StdRng,
}

impl<E: Environment> Trainer<E> {
    /// Build a trainer with a freshly initialised online network; the
    /// target network starts as an exact copy.
    pub fn new(config: TrainerConfig, env: E) -> Result<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let network = NeuralNetwork::q_network_with_init(
            env.observation_size(),
            &config.hidden_sizes,
            config.hidden_activation,
            env.action_space().n,
            config.weight_init,
            config.build_optimizer(),
            &mut rng,
        )?;
        Self::assemble(config, env, network, rng)
    }

    /// Build a trainer around an existing network, e.g. a loaded checkpoint
    pub fn with_network(config: TrainerConfig, env: E, network: NeuralNetwork) -> Result<Self> {
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed);
        Self::assemble(config, env, network, rng)
    }

    fn assemble(config: TrainerConfig, env: E, network: NeuralNetwork, rng: StdRng) -> Result<Self> {
        let action_space = env.action_space();
        let state_size = env.observation_size();
        if action_space.n == 0 || state_size == 0 {
            return Err(DqnError::invalid_parameter(
                "environment",
                "needs a non-empty state and action space",
            ));
        }
        if network.input_size() != state_size || network.num_actions() != action_space.n {
            return Err(DqnError::dimension_mismatch(
                format!("network {} -> {}", state_size, action_space.n),
                format!("network {} -> {}", network.input_size(), network.num_actions()),
            ));
        }

        let buffer = ReplayBuffer::new(config.replay_capacity)?.with_shape(state_size, action_space.n);
        let agent = DqnAgent::new(
            network,
            config.gamma,
            config.learning_rate,
            config.loss.build(config.huber_delta),
        );
        let state = TrainerState {
            step_count: 0,
            buffer,
            agent,
            window: EpisodeWindow::new(config.convergence_window),
            phase: Phase::Training,
            target_syncs: 0,
            episodes_completed: 0,
        };

        Ok(Trainer {
            config,
            env,
            action_space,
            state,
            progress: EpisodeProgress::default(),
            metrics: MetricsTracker::new(),
            rng,
        })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn state(&self) -> &TrainerState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn metrics(&self) -> &MetricsTracker {
        &self.metrics
    }

    pub fn online(&self) -> &NeuralNetwork {
        &self.state.agent.q_network
    }

    pub fn target(&self) -> &NeuralNetwork {
        &self.state.agent.target_network
    }

    /// Give up the trainer, keeping the online network
    pub fn into_online(self) -> NeuralNetwork {
        self.state.agent.q_network
    }

    fn ensure_training(&self) -> Result<()> {
        match self.state.phase {
            Phase::Training => Ok(()),
            Phase::Evaluating => Err(DqnError::PolicyFrozen),
        }
    }

    /// Run one iteration of the per-step protocol, starting a new episode
    /// first if none is in progress.
    pub fn step(&mut self) -> Result<StepOutcome> {
        self.ensure_training()?;
        let state = match self.progress.current_state.take() {
            Some(state) => state,
            None => {
                let (state, _info) = self.env.reset()?;
                self.progress = EpisodeProgress::default();
                state
            }
        };

        self.state.step_count += 1;
        let epsilon = self.config.epsilon.value(self.state.step_count);
        let action = self.state.agent.act(state.view(), epsilon, &self.action_space, &mut self.rng)?;

        let step = self.env.step(action)?;
        let done = step.done();
        let reward = step.reward;

        self.state.buffer.add(Experience {
            state,
            action,
            reward,
            next_state: step.next_state.clone(),
            done,
        })?;
        self.progress.current_state = Some(step.next_state);
        self.progress.steps += 1;
        self.progress.total_reward += reward;

        let loss = if self.state.buffer.len() >= self.config.batch_size {
            let loss = self.update()?;
            self.metrics.record_loss(loss);
            Some(loss)
        } else {
            None
        };

        let target_synced = self.state.step_count % self.config.target_sync_interval == 0;
        if target_synced {
            self.sync_target()?;
        }

        let episode = if done {
            self.progress.current_state = None;
            Some(self.finish_episode(epsilon))
        } else {
            None
        };

        Ok(StepOutcome {
            action,
            reward,
            done,
            epsilon,
            loss,
            target_synced,
            episode,
        })
    }

    fn finish_episode(&mut self, epsilon: f32) -> EpisodeReport {
        let episode = self.state.episodes_completed;
        let steps = self.progress.steps;
        self.state.episodes_completed += 1;
        self.state.window.push(steps);

        let rolling_average = self.state.window.average().unwrap_or(steps as f32);
        let mean_loss = self.metrics.current_episode_loss();
        self.metrics.end_episode(steps, rolling_average, epsilon);

        info!(episode, steps, rolling_average, epsilon, "episode finished");

        let converged = rolling_average >= self.config.convergence_threshold;
        if converged {
            info!(
                episode,
                rolling_average,
                threshold = self.config.convergence_threshold,
                "policy converged, freezing for evaluation"
            );
            self.state.phase = Phase::Evaluating;
        }

        EpisodeReport {
            episode,
            steps,
            total_reward: self.progress.total_reward,
            rolling_average,
            epsilon,
            mean_loss,
            converged,
        }
    }

    /// Step until the current (or a new) episode ends
    pub fn run_episode(&mut self) -> Result<EpisodeReport> {
        loop {
            if let Some(report) = self.step()?.episode {
                return Ok(report);
            }
        }
    }

    /// Train until convergence or until `max_episodes` episodes have run
    pub fn train(&mut self) -> Result<TrainingOutcome> {
        self.ensure_training()?;
        let mut last_average = 0.0;
        while self.state.episodes_completed < self.config.max_episodes {
            let report = self.run_episode()?;
            last_average = report.rolling_average;
            if report.converged {
                return Ok(TrainingOutcome::Converged {
                    episode: report.episode,
                    average: report.rolling_average,
                });
            }
        }

        warn!(
            episodes = self.state.episodes_completed,
            last_average, "episode cap reached without convergence"
        );
        Ok(TrainingOutcome::EpisodeCapReached {
            episodes: self.state.episodes_completed,
            last_average,
        })
    }

    /// One TD update on a uniformly sampled batch
    pub fn update(&mut self) -> Result<f32> {
        self.ensure_training()?;
        let batch = self.state.buffer.sample(self.config.batch_size, &mut self.rng)?;
        let loss = self.state.agent.train_on_batch(&batch)?;
        debug!(step = self.state.step_count, loss, "td update");
        Ok(loss)
    }

    /// Copy the online parameters into the target network
    pub fn sync_target(&mut self) -> Result<()> {
        self.state.agent.update_target_network()?;
        self.state.target_syncs += 1;
        debug!(step = self.state.step_count, syncs = self.state.target_syncs, "target network synchronized");
        Ok(())
    }

    /// Freeze the policy and act greedily, without learning, for
    /// `max_episodes` episodes, or forever when `None`.
    ///
    /// `observer` sees every step after it is applied, with the environment
    /// in its post-step state. Bounded runs return every episode length;
    /// unbounded runs only keep running totals.
    pub fn evaluate<F>(&mut self, max_episodes: Option<usize>, mut observer: F) -> Result<EvaluationSummary>
    where
        F: FnMut(&E, &EvaluationStep),
    {
        if self.state.phase == Phase::Training {
            info!("entering evaluation, training disabled");
        }
        self.state.phase = Phase::Evaluating;
        self.progress = EpisodeProgress::default();

        let mut summary = EvaluationSummary::new(max_episodes.is_some());
        while max_episodes.map_or(true, |max| summary.episodes < max) {
            let episode = summary.episodes;
            let (mut state, _info) = self.env.reset()?;
            let mut steps = 0;
            loop {
                let action = self.state.agent.act_greedy(state.view())?;
                let step = self.env.step(action)?;
                steps += 1;
                let done = step.done();
                trace!(episode, step = steps, action, reward = step.reward, "greedy step");
                observer(
                    &self.env,
                    &EvaluationStep {
                        episode,
                        step: steps,
                        action,
                        reward: step.reward,
                        done,
                    },
                );
                state = step.next_state;
                if done {
                    break;
                }
            }
            info!(episode, steps, "evaluation episode finished");
            summary.record(steps);
        }
        Ok(summary)
    }
}
