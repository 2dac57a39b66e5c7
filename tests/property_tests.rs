#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;
    use cartpole_dqn::agent::{argmax, bellman_targets};
    use cartpole_dqn::replay_buffer::{Experience, ReplayBuffer};
    use cartpole_dqn::schedule::{decay, EpsilonSchedule};
    use ndarray::{array, Array1};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    // Strategy for generating valid schedules
    fn schedule_strategy() -> impl Strategy<Value = EpsilonSchedule> {
        (0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..0.1).prop_map(|(a, b, rate)| EpsilonSchedule {
            start: a.max(b),
            end: a.min(b),
            rate,
        })
    }

    fn experience(seq: usize) -> Experience {
        Experience {
            state: array![seq as f32],
            action: 0,
            reward: seq as f32,
            next_state: array![seq as f32 + 1.0],
            done: false,
        }
    }

    proptest! {
        #[test]
        fn test_epsilon_is_non_increasing_and_bounded(
            schedule in schedule_strategy(),
            step in 0u64..100_000,
            gap in 1u64..1_000,
        ) {
            let now = schedule.value(step);
            let later = schedule.value(step + gap);
            prop_assert!(later <= now);
            prop_assert!(now <= schedule.start);
            prop_assert!(later >= schedule.end);
        }

        #[test]
        fn test_epsilon_starts_at_start(schedule in schedule_strategy()) {
            prop_assert_eq!(decay(schedule.start, schedule.end, schedule.rate, 0), schedule.start);
        }

        #[test]
        fn test_buffer_never_exceeds_capacity(capacity in 1usize..64, inserts in 0usize..200) {
            let mut buffer = ReplayBuffer::new(capacity).unwrap();
            for seq in 0..inserts {
                buffer.add(experience(seq)).unwrap();
                prop_assert!(buffer.len() <= capacity);
            }
            prop_assert_eq!(buffer.len(), inserts.min(capacity));

            // Survivors are the most recent insertions, oldest first
            let oldest = inserts.saturating_sub(capacity);
            let tags: Vec<usize> = buffer.iter().map(|e| e.reward as usize).collect();
            prop_assert_eq!(tags, (oldest..inserts).collect::<Vec<_>>());
        }

        #[test]
        fn test_sample_has_requested_size(len in 1usize..64, seed in any::<u64>()) {
            let mut buffer = ReplayBuffer::new(64).unwrap();
            for seq in 0..len {
                buffer.add(experience(seq)).unwrap();
            }
            let mut rng = StdRng::seed_from_u64(seed);
            let n = len / 2 + 1;
            let sample = buffer.sample(n, &mut rng).unwrap();
            prop_assert_eq!(sample.len(), n);
            prop_assert!(buffer.sample(len + 1, &mut rng).is_err());
        }

        #[test]
        fn test_terminal_targets_ignore_next_value(
            reward in -10.0f32..10.0,
            next in -1e6f32..1e6,
            gamma in 0.0f32..=1.0,
        ) {
            let targets = bellman_targets(
                Array1::from(vec![reward]).view(),
                Array1::from(vec![1.0]).view(),
                Array1::from(vec![next]).view(),
                gamma,
            );
            prop_assert_eq!(targets[0], reward);
        }

        #[test]
        fn test_argmax_picks_a_maximum(values in prop::collection::vec(-100.0f32..100.0, 1..10)) {
            let values = Array1::from(values);
            let best = argmax(values.view()).unwrap();
            prop_assert!(values.iter().all(|&v| v <= values[best]));
            prop_assert!(values.iter().take(best).all(|&v| v < values[best]));
        }
    }
}
