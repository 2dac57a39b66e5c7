use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use crate::error::{DqnError, Result};

/// An action-value approximator: maps states to one value per action.
///
/// Evaluation through this trait is always detached; implementations must
/// not record anything that could feed a gradient.
pub trait QFunction {
    /// Size of the discrete action set
    fn num_actions(&self) -> usize;

    /// Q-values for a batch of states, one row per state
    fn action_values_batch(&self, states: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Q-values for a single state
    fn action_values(&self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        let values = self.action_values_batch(state.insert_axis(Axis(0)))?;
        Ok(values.index_axis_move(Axis(0), 0))
    }

    /// Index of the highest-valued action; ties go to the lowest index
    fn act_greedy(&self, state: ArrayView1<f32>) -> Result<usize> {
        let values = self.action_values(state)?;
        argmax(values.view())
    }
}

/// First-index argmax. Fails on an empty vector or non-finite values.
pub fn argmax(values: ArrayView1<f32>) -> Result<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(DqnError::NumericalError(format!(
                "non-finite action-value {} at index {}",
                value, index
            )));
        }
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
        .ok_or_else(|| DqnError::NumericalError("No action-values to choose from".to_string()))
}

/// Row-wise maximum, one scalar per state. Fails on non-finite values.
pub fn max_per_row(values: ArrayView2<f32>) -> Result<Array1<f32>> {
    if values.ncols() == 0 {
        return Err(DqnError::NumericalError("Cannot take max over zero actions".to_string()));
    }
    if let Some(((row, col), value)) = values.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(DqnError::NumericalError(format!(
            "non-finite action-value {} at row {}, action {}",
            value, row, col
        )));
    }
    Ok(values.map_axis(Axis(1), |row| row.fold(f32::NEG_INFINITY, |max, &v| max.max(v))))
}
