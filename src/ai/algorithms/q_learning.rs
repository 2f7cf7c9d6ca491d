use rand::rngs::StdRng;
use rand::Rng;

use crate::ai::agent::{greedy_action, make_rng, random_action, Policy, Trainable};
use crate::ai::search::terminal_value;
use crate::ai::table::ValueTable;
use crate::game::{BoardKey, GameState, Player};
use crate::training::trainer::DecayConfig;

/// Q-learning hyperparameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    pub alpha: f64,
    pub epsilon: f64,
    pub gamma: f64,
    pub episodes: usize,
    pub seed: Option<u64>,
    pub decay: DecayConfig,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        QLearningConfig {
            alpha: 0.3,
            epsilon: 0.2,
            gamma: 0.9,
            episodes: 200_000,
            seed: None,
            decay: DecayConfig::every(20_000),
        }
    }
}

type StateAction = (BoardKey, usize);

/// Tabular Q-learning over two tables: `q_x` is maximised by X, `q_o` is
/// minimised by O. Both sides of every self-play game share the same policy.
pub struct QLearningAgent {
    q_x: ValueTable<StateAction>,
    q_o: ValueTable<StateAction>,
    alpha: f64,
    epsilon: f64,
    gamma: f64,
    rng: StdRng,
}

impl QLearningAgent {
    pub fn new(config: &QLearningConfig) -> Self {
        QLearningAgent {
            q_x: ValueTable::new(),
            q_o: ValueTable::new(),
            alpha: config.alpha,
            epsilon: config.epsilon,
            gamma: config.gamma,
            rng: make_rng(config.seed),
        }
    }

    pub fn q_x(&self) -> &ValueTable<StateAction> {
        &self.q_x
    }

    pub fn q_o(&self) -> &ValueTable<StateAction> {
        &self.q_o
    }

    /// Entries in both tables together.
    pub fn table_len(&self) -> usize {
        self.q_x.len() + self.q_o.len()
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Greedy (action, value) for the side to move, reading the mover's table.
    fn best_q(&mut self, state: &GameState) -> (usize, f64) {
        let player = state.turn();
        let key = state.key();
        let legal = state.legal_actions();
        let rng = &mut self.rng;
        let table = match player {
            Player::X => &mut self.q_x,
            Player::O => &mut self.q_o,
        };
        let scored: Vec<(usize, f64)> = legal
            .into_iter()
            .map(|action| (action, table.get_or_init((key, action), rng)))
            .collect();
        greedy_action(player, scored).expect("No legal actions available")
    }

    fn select(&mut self, state: &GameState) -> usize {
        if self.rng.random::<f64>() < self.epsilon {
            let legal = state.legal_actions();
            random_action(&mut self.rng, &legal)
        } else {
            self.best_q(state).0
        }
    }

    /// Move `Q[entry]` toward `target`; returns the squared error before the step.
    fn update(&mut self, player: Player, entry: StateAction, target: f64) -> f64 {
        let alpha = self.alpha;
        let rng = &mut self.rng;
        let table = match player {
            Player::X => &mut self.q_x,
            Player::O => &mut self.q_o,
        };
        let current = table.get_or_init(entry, rng);
        let error = target - current;
        table.set(entry, current + alpha * error);
        error * error
    }
}

impl Policy for QLearningAgent {
    fn choice(&mut self, state: &mut GameState) -> usize {
        self.select(state)
    }

    fn name(&self) -> &str {
        "Q"
    }
}

impl Trainable for QLearningAgent {
    fn epsilon(&self) -> f64 {
        self.epsilon
    }

    fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }

    fn learning_rate(&self) -> f64 {
        self.alpha
    }

    fn set_learning_rate(&mut self, learning_rate: f64) {
        self.alpha = learning_rate;
    }

    /// Each player's previous move is bootstrapped from the best entry of the
    /// player's own table at the board it faces next, two plies later.
    fn train_single_game(&mut self, state: &mut GameState) -> Vec<f64> {
        state.reset();
        let mut pending: [Option<StateAction>; 2] = [None, None];
        let mut losses = Vec::new();

        while !state.is_terminal() {
            let mover = state.turn();
            if let Some(entry) = pending[mover.index()] {
                let (_, best_next) = self.best_q(state);
                losses.push(self.update(mover, entry, self.gamma * best_next));
            }

            let key = state.key();
            let action = self.select(state);
            state.execute(action);
            pending[mover.index()] = Some((key, action));
        }

        let reward = terminal_value(state);
        // The player who moved last first, then the other side.
        let last = state.turn().other();
        for player in [last, last.other()] {
            if let Some(entry) = pending[player.index()] {
                losses.push(self.update(player, entry, reward));
            }
        }

        log::debug!(
            "q-learning episode: {} plies, reward {reward}, {} entries",
            state.ply(),
            self.table_len()
        );
        losses
    }
}
