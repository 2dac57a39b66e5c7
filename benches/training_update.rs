use cartpole_dqn::activations::Activation;
use cartpole_dqn::agent::DqnAgent;
use cartpole_dqn::env::{CartPole, Environment};
use cartpole_dqn::loss::HuberLoss;
use cartpole_dqn::network::NeuralNetwork;
use cartpole_dqn::optimizer::{Adam, OptimizerWrapper};
use cartpole_dqn::replay_buffer::{Experience, ReplayBuffer};
use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::Array1;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Random-policy CartPole transitions
fn filled_buffer(rng: &mut StdRng) -> ReplayBuffer {
    let mut env = CartPole::new(0);
    let mut buffer = ReplayBuffer::new(5_000).unwrap();
    let (mut state, _) = env.reset().unwrap();
    while buffer.len() < 5_000 {
        let action = env.action_space().sample(rng);
        let step = env.step(action).unwrap();
        let done = step.done();
        let next_state: Array1<f32> = step.next_state;
        buffer
            .add(Experience { state, action, reward: step.reward, next_state: next_state.clone(), done })
            .unwrap();
        state = if done { env.reset().unwrap().0 } else { next_state };
    }
    buffer
}

fn bench_train_on_batch(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let buffer = filled_buffer(&mut rng);
    let network = NeuralNetwork::q_network(
        4,
        &[64],
        Activation::Tanh,
        2,
        OptimizerWrapper::Adam(Adam::default()),
        &mut rng,
    )
    .unwrap();
    let mut agent = DqnAgent::new(network, 0.99, 5e-4, Box::new(HuberLoss::default()));

    c.bench_function("train_on_batch_32", |b| {
        b.iter(|| {
            let batch = buffer.sample(32, &mut rng).unwrap();
            agent.train_on_batch(&batch).unwrap()
        });
    });

    c.bench_function("greedy_action", |b| {
        let state = Array1::from(vec![0.01, -0.02, 0.03, 0.04]);
        b.iter(|| agent.act_greedy(state.view()).unwrap());
    });
}

criterion_group!(benches, bench_train_on_batch);
criterion_main!(benches);
