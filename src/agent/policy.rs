use ndarray::ArrayView1;
use rand::Rng;

use crate::agent::QFunction;
use crate::env::DiscreteSpace;
use crate::error::Result;

/// Epsilon-greedy action selection.
///
/// Draws `u` uniformly from `[0, 1)`. If `u < epsilon` a uniformly random
/// action is sampled from `action_space`; otherwise the greedy action of
/// `q_function` is returned. All randomness comes from `rng`.
pub fn select_action<Q, R>(
    state: ArrayView1<f32>,
    epsilon: f32,
    q_function: &Q,
    action_space: &DiscreteSpace,
    rng: &mut R,
) -> Result<usize>
where
    Q: QFunction + ?Sized,
    R: Rng + ?Sized,
{
    let u: f32 = rng.gen();
    if u < epsilon {
        Ok(action_space.sample(rng))
    } else {
        q_function.act_greedy(state)
    }
}
