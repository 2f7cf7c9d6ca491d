use burn::backend::{Autodiff, NdArray};
use burn::module::AutodiffModule;
use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::{GradientsParams, Optimizer, Sgd, SgdConfig};
use burn::prelude::*;
use burn::tensor::TensorData;
use rand::rngs::StdRng;
use rand::Rng;

use crate::ai::agent::{greedy_action, make_rng, random_action, Policy, Trainable};
use crate::ai::networks::{ValueNetwork, ValueNetworkConfig};
use crate::ai::search::terminal_value;
use crate::ai::state_encoding::{encode_position, encode_positions_batch, input_dim};
use crate::game::{Board, GameState, Player, Topology};
use crate::training::trainer::DecayConfig;

type InferBackend = NdArray<f32>;
type TrainBackend = Autodiff<InferBackend>;

/// Value approximator hyperparameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ValueConfig {
    pub learning_rate: f64,
    pub epsilon: f64,
    pub gamma: f64,
    pub hidden_layers: usize,
    pub hidden_dim: usize,
    pub episodes: usize,
    pub seed: Option<u64>,
    pub decay: DecayConfig,
}

impl Default for ValueConfig {
    fn default() -> Self {
        ValueConfig {
            learning_rate: 0.15,
            epsilon: 0.2,
            gamma: 0.9,
            hidden_layers: 1,
            hidden_dim: 58,
            episodes: 70_000,
            seed: None,
            decay: DecayConfig::every(7_000),
        }
    }
}

/// Monte-Carlo target for the position reached after `ply` actions of a game
/// that ended after `final_ply` actions: the outcome discounted back from the
/// end and mapped from [-1, 1] onto the network's [0, 1] range.
pub fn discounted_target(gamma: f64, final_ply: usize, ply: usize, outcome: f64) -> f64 {
    debug_assert!(ply <= final_ply);
    0.5 * gamma.powi((final_ply - ply) as i32) * outcome + 0.5
}

/// Self-play learner for a feed-forward value network, trained with SGD on
/// mean squared error after every game.
pub struct ValueAgent {
    network: ValueNetwork<TrainBackend>,
    optimizer: OptimizerAdaptor<Sgd<InferBackend>, ValueNetwork<TrainBackend>, TrainBackend>,
    device: <TrainBackend as Backend>::Device,
    learning_rate: f64,
    epsilon: f64,
    gamma: f64,
    episode_count: usize,
    rng: StdRng,
}

impl ValueAgent {
    pub fn new(topology: Topology, config: &ValueConfig) -> Self {
        let device = Default::default();
        if let Some(seed) = config.seed {
            TrainBackend::seed(seed);
        }
        let network = ValueNetworkConfig::new(input_dim(topology))
            .with_hidden_layers(config.hidden_layers)
            .with_hidden_dim(config.hidden_dim)
            .init(&device);
        let optimizer = SgdConfig::new().init();

        ValueAgent {
            network,
            optimizer,
            device,
            learning_rate: config.learning_rate,
            epsilon: config.epsilon,
            gamma: config.gamma,
            episode_count: 0,
            rng: make_rng(config.seed),
        }
    }

    pub fn network(&self) -> &ValueNetwork<TrainBackend> {
        &self.network
    }

    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    /// Network estimate for one position, without gradient tracking.
    pub fn estimate(&self, board: &Board, turn: Player) -> f64 {
        let input = encode_positions_batch::<InferBackend>(&[(board, turn)], &self.device);
        let output: Vec<f32> = self
            .network
            .valid()
            .forward(input)
            .into_data()
            .to_vec()
            .expect("f32 tensor data extraction");
        output[0] as f64
    }

    /// Epsilon-greedy: otherwise score every child position in one batch.
    fn pick_action(&mut self, state: &mut GameState) -> usize {
        let legal = state.legal_actions();
        if self.rng.random::<f64>() < self.epsilon {
            return random_action(&mut self.rng, &legal);
        }

        let player = state.turn();
        let mut children = Vec::with_capacity(legal.len());
        for &action in &legal {
            state.execute(action);
            children.push((state.board().clone(), state.turn()));
            state.undo(action);
        }
        let batch: Vec<(&Board, Player)> = children.iter().map(|(b, t)| (b, *t)).collect();
        let input = encode_positions_batch::<InferBackend>(&batch, &self.device);
        let values: Vec<f32> = self
            .network
            .valid()
            .forward(input)
            .into_data()
            .to_vec()
            .expect("f32 tensor data extraction");

        greedy_action(
            player,
            legal.iter().copied().zip(values.iter().map(|v| *v as f64)),
        )
        .map(|(action, _)| action)
        .expect("No legal actions available")
    }

    /// One SGD step toward `target` for a single position; returns the loss.
    fn train_step(&mut self, features: Vec<f32>, target: f64) -> f64 {
        let dim = features.len();
        let input = Tensor::<TrainBackend, 2>::from_data(
            TensorData::new(features, [1, dim]),
            &self.device,
        );
        let target = Tensor::<TrainBackend, 2>::from_data(
            TensorData::new(vec![target as f32], [1, 1]),
            &self.device,
        );

        let prediction = self.network.forward(input);
        let diff = prediction - target;
        let loss = (diff.clone() * diff).mean();

        let loss_val: f32 = loss
            .clone()
            .into_data()
            .to_vec::<f32>()
            .expect("f32 loss tensor extraction")[0];

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.network);
        self.network = self
            .optimizer
            .step(self.learning_rate, self.network.clone(), grads);

        loss_val as f64
    }
}

impl Policy for ValueAgent {
    fn choice(&mut self, state: &mut GameState) -> usize {
        self.pick_action(state)
    }

    fn name(&self) -> &str {
        "Deep"
    }
}

impl Trainable for ValueAgent {
    fn epsilon(&self) -> f64 {
        self.epsilon
    }

    fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }

    fn train_single_game(&mut self, state: &mut GameState) -> Vec<f64> {
        state.reset();

        // Every position of the game, the empty board included.
        let mut episode = vec![(encode_position(state.board(), state.turn()), state.ply())];
        while !state.is_terminal() {
            let action = self.pick_action(state);
            state.execute(action);
            episode.push((encode_position(state.board(), state.turn()), state.ply()));
        }

        let final_ply = state.ply();
        let outcome = terminal_value(state);
        let losses = episode
            .into_iter()
            .map(|(features, ply)| {
                let target = discounted_target(self.gamma, final_ply, ply, outcome);
                self.train_step(features, target)
            })
            .collect();

        self.episode_count += 1;
        log::debug!(
            "value episode {}: {final_ply} plies, outcome {outcome}",
            self.episode_count
        );
        losses
    }
}
