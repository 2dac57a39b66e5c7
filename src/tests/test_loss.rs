use approx::assert_abs_diff_eq;
use ndarray::{array, Array1};

use crate::loss::{HuberLoss, Loss, LossKind, MeanSquaredError};

fn assert_close(actual: &Array1<f32>, expected: &[f32]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert_abs_diff_eq!(*a, *e, epsilon = 1e-6);
    }
}

#[test]
fn test_huber_both_branches() {
    let loss = HuberLoss::default();
    let predictions = array![0.5, 3.0, -2.0];
    let targets = Array1::<f32>::zeros(3);

    // (0.125 + 2.5 + 1.5) / 3
    assert_abs_diff_eq!(loss.compute(predictions.view(), targets.view()), 1.375, epsilon = 1e-6);
    let gradient = loss.gradient(predictions.view(), targets.view());
    assert_close(&gradient, &[0.5 / 3.0, 1.0 / 3.0, -1.0 / 3.0]);
}

#[test]
fn test_huber_delta_scaling() {
    let loss = HuberLoss::new(2.0);
    let predictions = array![2.0, 5.0];
    let targets = array![1.0, 1.0];

    // 0.5 * 1 / 2 = 0.25 and 4 - 1 = 3
    assert_abs_diff_eq!(loss.compute(predictions.view(), targets.view()), 1.625, epsilon = 1e-6);
    let gradient = loss.gradient(predictions.view(), targets.view());
    assert_close(&gradient, &[0.25, 0.5]);
}

#[test]
fn test_huber_zero_at_target() {
    let loss = HuberLoss::default();
    let values = array![1.0, -4.0];
    assert_eq!(loss.compute(values.view(), values.view()), 0.0);
    assert_close(&loss.gradient(values.view(), values.view()), &[0.0, 0.0]);
}

#[test]
fn test_mse_value_and_gradient() {
    let loss = MeanSquaredError;
    let predictions = array![1.0, -2.0, 3.0];
    let targets = array![0.0, 0.0, 1.0];

    assert_abs_diff_eq!(loss.compute(predictions.view(), targets.view()), 3.0, epsilon = 1e-6);
    let gradient = loss.gradient(predictions.view(), targets.view());
    assert_close(&gradient, &[2.0 / 3.0, -4.0 / 3.0, 4.0 / 3.0]);
}

#[test]
fn test_loss_kind_build() {
    let predictions = array![0.5, 3.0];
    let targets = array![0.0, 0.0];

    let huber = LossKind::Huber.build(2.0);
    let expected = HuberLoss::new(2.0).compute(predictions.view(), targets.view());
    assert_eq!(huber.compute(predictions.view(), targets.view()), expected);

    let mse = LossKind::Mse.build(2.0);
    assert_abs_diff_eq!(mse.compute(predictions.view(), targets.view()), 4.625, epsilon = 1e-6);
    assert_eq!(LossKind::default(), LossKind::Huber);
}
