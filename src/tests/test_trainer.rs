use super::FixedHorizonEnv;
use crate::config::TrainerConfig;
use crate::error::DqnError;
use crate::layers::WeightInit;
use crate::trainer::{EvaluationSummary, Phase, Trainer, TrainingOutcome};

fn config() -> TrainerConfig {
    TrainerConfig {
        seed: 7,
        hidden_sizes: vec![16],
        ..TrainerConfig::default()
    }
}

/// Never converges on a 500-step horizon
fn unsolvable() -> TrainerConfig {
    TrainerConfig {
        convergence_threshold: 1000.0,
        ..config()
    }
}

#[test]
fn test_single_perfect_episode_converges() {
    let mut trainer = Trainer::new(config(), FixedHorizonEnv::new(500)).unwrap();
    let report = trainer.run_episode().unwrap();

    assert_eq!(report.episode, 0);
    assert_eq!(report.steps, 500);
    assert_eq!(report.total_reward, 500.0);
    assert_eq!(report.rolling_average, 500.0);
    assert!(report.converged);
    assert!(report.mean_loss.is_some());

    let state = trainer.state();
    assert_eq!(state.step_count, 500);
    assert_eq!(state.buffer.len(), 500);
    assert_eq!(state.episodes_completed, 1);
    assert_eq!(trainer.phase(), Phase::Evaluating);
    assert_eq!(trainer.metrics().metrics().episode_lengths, vec![500]);
}

#[test]
fn test_train_reports_convergence() {
    let mut trainer = Trainer::new(config(), FixedHorizonEnv::new(500)).unwrap();
    assert_eq!(
        trainer.train().unwrap(),
        TrainingOutcome::Converged { episode: 0, average: 500.0 }
    );
}

#[test]
fn test_target_sync_on_interval() {
    let config = TrainerConfig { max_episodes: 2, ..unsolvable() };
    let mut trainer = Trainer::new(config, FixedHorizonEnv::new(500)).unwrap();

    let mut synced_at = Vec::new();
    while trainer.state().step_count < 1000 {
        let outcome = trainer.step().unwrap();
        if outcome.target_synced {
            synced_at.push(trainer.state().step_count);
        }
        if trainer.state().step_count == 999 {
            assert!(!trainer.target().parameters_equal(trainer.online()));
        }
    }

    assert_eq!(synced_at, vec![1000]);
    assert_eq!(trainer.state().target_syncs, 1);
    assert!(trainer.target().parameters_equal(trainer.online()));
}

#[test]
fn test_buffer_capacity_respected() {
    let config = TrainerConfig { replay_capacity: 256, max_episodes: 1, ..unsolvable() };
    let mut trainer = Trainer::new(config, FixedHorizonEnv::new(500)).unwrap();
    let outcome = trainer.train().unwrap();

    assert_eq!(outcome, TrainingOutcome::EpisodeCapReached { episodes: 1, last_average: 500.0 });
    assert_eq!(trainer.state().buffer.len(), 256);
    assert_eq!(trainer.state().step_count, 500);
}

#[test]
fn test_updates_start_with_full_batch() {
    let mut trainer = Trainer::new(unsolvable(), FixedHorizonEnv::new(500)).unwrap();
    for step in 1..=40 {
        let outcome = trainer.step().unwrap();
        assert_eq!(outcome.loss.is_some(), step >= 32, "step {}", step);
    }
    assert_eq!(trainer.state().agent.train_steps, 9);
}

#[test]
fn test_epsilon_follows_global_counter() {
    let mut trainer = Trainer::new(unsolvable(), FixedHorizonEnv::new(500)).unwrap();
    let first = trainer.step().unwrap();
    assert_eq!(first.epsilon, trainer.config().epsilon.value(1));

    trainer.run_episode().unwrap();
    let outcome = trainer.step().unwrap();
    assert_eq!(trainer.state().step_count, 501);
    assert_eq!(outcome.epsilon, trainer.config().epsilon.value(501));
    assert_eq!(trainer.env().resets, 2);
}

#[test]
fn test_frozen_after_convergence() {
    let mut trainer = Trainer::new(config(), FixedHorizonEnv::new(500)).unwrap();
    trainer.train().unwrap();

    assert!(matches!(trainer.step(), Err(DqnError::PolicyFrozen)));
    assert!(matches!(trainer.update(), Err(DqnError::PolicyFrozen)));
    assert!(matches!(trainer.train(), Err(DqnError::PolicyFrozen)));
    assert_eq!(trainer.state().step_count, 500);
}

#[test]
fn test_evaluation_is_greedy_and_frozen() {
    let mut trainer = Trainer::new(config(), FixedHorizonEnv::new(500)).unwrap();
    trainer.train().unwrap();
    let online = trainer.online().clone();
    let target = trainer.target().clone();
    let buffered = trainer.state().buffer.len();

    let mut observed = 0;
    let summary = trainer
        .evaluate(Some(2), |env, step| {
            observed += 1;
            assert_eq!(env.t, step.step);
            assert!(step.action < 2);
        })
        .unwrap();

    assert_eq!(summary.lengths, vec![500, 500]);
    assert_eq!(summary.episodes, 2);
    assert_eq!(summary.mean_length(), Some(500.0));
    assert_eq!(observed, 1000);
    assert_eq!(trainer.state().step_count, 500);
    assert_eq!(trainer.state().buffer.len(), buffered);
    assert!(trainer.online().parameters_equal(&online));
    assert!(trainer.target().parameters_equal(&target));
}

#[test]
fn test_evaluate_freezes_untrained_policy() {
    let mut trainer = Trainer::new(config(), FixedHorizonEnv::new(20)).unwrap();
    assert_eq!(trainer.evaluate(Some(1), |_, _| {}).unwrap().lengths, vec![20]);
    assert_eq!(trainer.phase(), Phase::Evaluating);
    assert!(matches!(trainer.step(), Err(DqnError::PolicyFrozen)));
}

#[test]
fn test_episode_cap() {
    let config = TrainerConfig { max_episodes: 3, ..unsolvable() };
    let mut trainer = Trainer::new(config, FixedHorizonEnv::new(10)).unwrap();

    assert_eq!(
        trainer.train().unwrap(),
        TrainingOutcome::EpisodeCapReached { episodes: 3, last_average: 10.0 }
    );
    assert_eq!(trainer.state().step_count, 30);
    assert_eq!(trainer.phase(), Phase::Training);
}

#[test]
fn test_rolling_average_over_window() {
    let config = TrainerConfig { convergence_window: 2, convergence_threshold: 15.0, ..config() };
    let mut trainer = Trainer::new(config, FixedHorizonEnv::new(10)).unwrap();
    trainer.run_episode().unwrap();
    trainer.env_mut().horizon = 20;
    let report = trainer.run_episode().unwrap();
    assert_eq!(report.rolling_average, 15.0);
    assert!(report.converged);
}

#[test]
fn test_same_seed_is_deterministic() {
    let run = || {
        let mut trainer = Trainer::new(unsolvable(), FixedHorizonEnv::new(100)).unwrap();
        let mut actions = Vec::new();
        for _ in 0..300 {
            actions.push(trainer.step().unwrap().action);
        }
        (actions, trainer.into_online())
    };

    let (actions_a, online_a) = run();
    let (actions_b, online_b) = run();
    assert_eq!(actions_a, actions_b);
    assert!(online_a.parameters_equal(&online_b));
}

#[test]
fn test_environment_error_propagates() {
    let mut env = FixedHorizonEnv::new(500);
    env.fail_at = Some(10);
    let mut trainer = Trainer::new(config(), env).unwrap();

    for _ in 0..9 {
        trainer.step().unwrap();
    }
    assert!(matches!(trainer.step(), Err(DqnError::Environment(_))));
}

#[test]
fn test_rejects_invalid_config() {
    let config = TrainerConfig { batch_size: 0, ..config() };
    assert!(Trainer::new(config, FixedHorizonEnv::new(10)).is_err());
}

#[test]
fn test_unbounded_summary_keeps_only_totals() {
    let mut summary = EvaluationSummary::new(false);
    assert_eq!(summary.mean_length(), None);
    for length in 1..=10_000 {
        summary.record(length % 7 + 1);
    }
    assert_eq!(summary.episodes, 10_000);
    assert!(summary.lengths.is_empty());
    assert_eq!(summary.total_steps, (1..=10_000u64).map(|l| l % 7 + 1).sum::<u64>());

    let mut bounded = EvaluationSummary::new(true);
    bounded.record(3);
    bounded.record(5);
    assert_eq!(bounded.lengths, vec![3, 5]);
    assert_eq!(bounded.mean_length(), Some(4.0));
}

#[test]
fn test_config_selects_weight_init() {
    let config = TrainerConfig { weight_init: WeightInit::XavierUniform, ..config() };
    let trainer = Trainer::new(config, FixedHorizonEnv::new(10)).unwrap();
    assert!(trainer.online().layers.iter().all(|layer| layer.biases.iter().all(|&b| b == 0.0)));
    assert!(trainer.target().parameters_equal(trainer.online()));
}
