use crate::schedule::{decay, EpsilonSchedule};

#[test]
fn test_decay_starts_at_start() {
    assert_eq!(decay(1.0, 0.001, 0.003, 0), 1.0);
    assert_eq!(decay(0.5, 0.1, 0.2, 0), 0.5);
}

#[test]
fn test_decay_approaches_end() {
    let epsilon = decay(1.0, 0.001, 0.003, 10_000);
    assert!((epsilon - 0.001).abs() < 1e-6, "epsilon = {}", epsilon);
}

#[test]
fn test_decay_huge_step_is_end() {
    assert_eq!(decay(1.0, 0.001, 0.003, u64::MAX), 0.001);
}

#[test]
fn test_decay_non_increasing() {
    let schedule = EpsilonSchedule::default();
    let mut previous = schedule.value(0);
    for step in 1..5_000 {
        let current = schedule.value(step);
        assert!(current <= previous, "step {}: {} > {}", step, current, previous);
        previous = current;
    }
}

#[test]
fn test_decay_known_value() {
    // 0.001 + 0.999 * e^-3
    let expected = 0.001 + 0.999 * (-3.0f64).exp();
    approx::assert_abs_diff_eq!(decay(1.0, 0.001, 0.003, 1000), expected as f32, epsilon = 1e-6);
}

#[test]
fn test_schedule_validation() {
    assert!(EpsilonSchedule::new(1.0, 0.001, 0.003).is_ok());
    assert!(EpsilonSchedule::new(0.1, 0.5, 0.003).is_err());
    assert!(EpsilonSchedule::new(1.5, 0.1, 0.003).is_err());
    assert!(EpsilonSchedule::new(1.0, 0.1, -1.0).is_err());
    assert!(EpsilonSchedule::new(1.0, 0.1, f32::NAN).is_err());
}
