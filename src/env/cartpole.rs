use ndarray::{array, Array1};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use serde::{Serialize, Deserialize};

use super::{DiscreteSpace, Environment, Step, StepInfo};
use crate::error::{DqnError, Result};

/// Physical constants and episode limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartPoleConfig {
    pub gravity: f64,
    pub mass_cart: f64,
    pub mass_pole: f64,
    /// Half the pole's length
    pub length: f64,
    pub force_mag: f64,
    /// Seconds between state updates
    pub tau: f64,
    pub x_threshold: f64,
    /// Radians
    pub theta_threshold: f64,
    /// Steps after which the episode is truncated
    pub max_steps: usize,
}

impl Default for CartPoleConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            mass_cart: 1.0,
            mass_pole: 0.1,
            length: 0.5,
            force_mag: 10.0,
            tau: 0.02,
            x_threshold: 2.4,
            theta_threshold: 12.0 * 2.0 * std::f64::consts::PI / 360.0,
            max_steps: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct CartPoleState {
    x: f64,          // Cart position
    x_dot: f64,      // Cart velocity
    theta: f64,      // Pole angle
    theta_dot: f64,  // Pole angular velocity
}

/// Pole balanced on a cart moving along a frictionless track.
///
/// Two actions: 0 pushes the cart left, 1 pushes it right. Every step yields
/// reward 1.0. The episode terminates when the pole tips past
/// `theta_threshold` or the cart leaves `±x_threshold`, and is truncated
/// after `max_steps`.
pub struct CartPole {
    config: CartPoleConfig,
    state: CartPoleState,
    steps: usize,
    episode_over: bool,
    rng: StdRng,
}

impl CartPole {
    pub fn new(seed: u64) -> Self {
        Self::with_config(CartPoleConfig::default(), seed)
    }

    pub fn with_config(config: CartPoleConfig, seed: u64) -> Self {
        CartPole {
            config,
            state: CartPoleState::default(),
            steps: 0,
            // Step before reset is an error
            episode_over: true,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &CartPoleConfig {
        &self.config
    }

    fn observation(&self) -> Array1<f32> {
        array![
            self.state.x as f32,
            self.state.x_dot as f32,
            self.state.theta as f32,
            self.state.theta_dot as f32
        ]
    }

    fn is_terminal(&self) -> bool {
        self.state.x.abs() > self.config.x_threshold
            || self.state.theta.abs() > self.config.theta_threshold
    }
}

impl Environment for CartPole {
    fn observation_size(&self) -> usize {
        4
    }

    fn action_space(&self) -> DiscreteSpace {
        DiscreteSpace::new(2)
    }

    fn reset(&mut self) -> Result<(Array1<f32>, StepInfo)> {
        let mut sample = || self.rng.gen_range(-0.05..0.05);
        self.state = CartPoleState {
            x: sample(),
            x_dot: sample(),
            theta: sample(),
            theta_dot: sample(),
        };
        self.steps = 0;
        self.episode_over = false;

        Ok((self.observation(), StepInfo::new()))
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        if self.episode_over {
            return Err(DqnError::Environment(
                "step() called on a finished episode; call reset() first".to_string(),
            ));
        }
        if !self.action_space().contains(action) {
            return Err(DqnError::InvalidAction { action, num_actions: 2 });
        }

        let c = &self.config;
        let s = self.state;
        let force = if action == 1 { c.force_mag } else { -c.force_mag };
        let cos_theta = s.theta.cos();
        let sin_theta = s.theta.sin();

        let total_mass = c.mass_cart + c.mass_pole;
        let pole_mass_length = c.mass_pole * c.length;

        let temp = (force + pole_mass_length * s.theta_dot.powi(2) * sin_theta) / total_mass;
        let theta_acc = (c.gravity * sin_theta - cos_theta * temp)
            / (c.length * (4.0 / 3.0 - c.mass_pole * cos_theta.powi(2) / total_mass));
        let x_acc = temp - pole_mass_length * theta_acc * cos_theta / total_mass;

        // Explicit Euler
        self.state = CartPoleState {
            x: s.x + c.tau * s.x_dot,
            x_dot: s.x_dot + c.tau * x_acc,
            theta: s.theta + c.tau * s.theta_dot,
            theta_dot: s.theta_dot + c.tau * theta_acc,
        };
        self.steps += 1;

        let terminated = self.is_terminal();
        let truncated = self.steps >= self.config.max_steps;
        self.episode_over = terminated || truncated;

        let mut info = StepInfo::new();
        info.insert("elapsed_steps".to_string(), self.steps.into());

        Ok(Step {
            next_state: self.observation(),
            reward: 1.0,
            terminated,
            truncated,
            info,
        })
    }

    fn render(&self) -> Option<String> {
        const WIDTH: usize = 61;
        let span = 2.0 * self.config.x_threshold;
        let column = ((self.state.x + self.config.x_threshold) / span * (WIDTH - 1) as f64)
            .round()
            .clamp(0.0, (WIDTH - 1) as f64) as usize;

        let pole = match self.state.theta {
            t if t > 0.05 => '/',
            t if t < -0.05 => '\\',
            _ => '|',
        };

        let mut track: Vec<char> = vec!['-'; WIDTH];
        track[column] = pole;
        Some(format!(
            "[{}] step {:>3} x={:+.3} theta={:+.3}",
            track.into_iter().collect::<String>(),
            self.steps,
            self.state.x,
            self.state.theta
        ))
    }
}
