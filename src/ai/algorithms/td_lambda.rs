use rand::rngs::StdRng;
use rand::Rng;

use crate::ai::agent::{greedy_action, make_rng, random_action, Policy, Trainable};
use crate::ai::search::terminal_value;
use crate::ai::table::ValueTable;
use crate::game::{BoardKey, GameState};
use crate::training::trainer::DecayConfig;

/// TD(λ) hyperparameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TdLambdaConfig {
    pub alpha: f64,
    pub epsilon: f64,
    pub gamma: f64,
    pub lambda: f64,
    pub episodes: usize,
    pub seed: Option<u64>,
    pub decay: DecayConfig,
}

impl Default for TdLambdaConfig {
    fn default() -> Self {
        TdLambdaConfig {
            alpha: 0.3,
            epsilon: 0.2,
            gamma: 0.9,
            lambda: 0.8,
            episodes: 100_000,
            seed: None,
            decay: DecayConfig::every(10_000),
        }
    }
}

/// Accumulating eligibility traces, kept in first-visit order.
#[derive(Debug, Default)]
pub struct EligibilityTraces {
    traces: Vec<(BoardKey, f64)>,
}

impl EligibilityTraces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one to the trace of `key`.
    pub fn bump(&mut self, key: BoardKey) {
        match self.traces.iter_mut().find(|(k, _)| *k == key) {
            Some((_, z)) => *z += 1.0,
            None => self.traces.push((key, 1.0)),
        }
    }

    pub fn get(&self, key: &BoardKey) -> Option<f64> {
        self.traces
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, z)| *z)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut (BoardKey, f64)> {
        self.traces.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }
}

/// State-value learner with eligibility traces.
///
/// `V` is read from X's point of view: X moves toward high values, O toward
/// low ones.
pub struct TdLambdaAgent {
    values: ValueTable<BoardKey>,
    alpha: f64,
    epsilon: f64,
    gamma: f64,
    lambda: f64,
    rng: StdRng,
}

impl TdLambdaAgent {
    pub fn new(config: &TdLambdaConfig) -> Self {
        TdLambdaAgent {
            values: ValueTable::new(),
            alpha: config.alpha,
            epsilon: config.epsilon,
            gamma: config.gamma,
            lambda: config.lambda,
            rng: make_rng(config.seed),
        }
    }

    pub fn values(&self) -> &ValueTable<BoardKey> {
        &self.values
    }

    pub fn table_len(&self) -> usize {
        self.values.len()
    }

    fn value(&mut self, key: BoardKey) -> f64 {
        self.values.get_or_init(key, &mut self.rng)
    }

    fn select(&mut self, state: &mut GameState) -> usize {
        let legal = state.legal_actions();
        if self.rng.random::<f64>() < self.epsilon {
            return random_action(&mut self.rng, &legal);
        }

        let player = state.turn();
        let mut scored = Vec::with_capacity(legal.len());
        for action in legal {
            state.execute(action);
            let v = self.value(state.key());
            state.undo(action);
            scored.push((action, v));
        }
        greedy_action(player, scored)
            .map(|(action, _)| action)
            .expect("No legal actions available")
    }

    /// Spread `delta` over every traced state, then decay the traces.
    fn apply_traces(&mut self, traces: &mut EligibilityTraces, delta: f64) {
        let decay = self.gamma * self.lambda;
        for (key, z) in traces.iter_mut() {
            let v = self.values.get_or_init(*key, &mut self.rng);
            self.values.set(*key, v + self.alpha * delta * *z);
            *z *= decay;
        }
    }
}

impl Policy for TdLambdaAgent {
    fn choice(&mut self, state: &mut GameState) -> usize {
        self.select(state)
    }

    fn name(&self) -> &str {
        "TD"
    }
}

impl Trainable for TdLambdaAgent {
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

    fn train_single_game(&mut self, state: &mut GameState) -> Vec<f64> {
        state.reset();
        let mut traces = EligibilityTraces::new();
        let mut losses = Vec::new();

        let mut previous = state.key();
        let action = self.select(state);
        state.execute(action);

        while !state.is_terminal() {
            let current = state.key();
            traces.bump(previous);
            let delta = self.gamma * self.value(current) - self.value(previous);
            self.apply_traces(&mut traces, delta);
            losses.push(delta * delta);

            let action = self.select(state);
            state.execute(action);
            previous = current;
        }

        let reward = terminal_value(state);
        traces.bump(previous);
        let delta = reward - self.value(previous);
        self.apply_traces(&mut traces, delta);
        losses.push(delta * delta);
        self.values.set(state.key(), reward);

        log::debug!(
            "td episode: {} plies, reward {reward}, {} traced, {} values",
            state.ply(),
            traces.len(),
            self.values.len()
        );
        losses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Player;

    fn seeded(seed: u64, epsilon: f64) -> TdLambdaAgent {
        TdLambdaAgent::new(&TdLambdaConfig {
            epsilon,
            seed: Some(seed),
            ..Default::default()
        })
    }

    #[test]
    fn test_defaults() {
        let config = TdLambdaConfig::default();
        assert_eq!(config.lambda, 0.8);
        assert_eq!(config.episodes, 100_000);
    }

    #[test]
    fn test_traces_accumulate() {
        let mut traces = EligibilityTraces::new();
        let a = GameState::tic_tac_toe().key();
        let mut state = GameState::tic_tac_toe();
        state.execute(0);
        let b = state.key();

        traces.bump(a);
        traces.bump(b);
        traces.bump(a);
        assert_eq!(traces.len(), 2);
        assert_eq!(traces.get(&a), Some(2.0));
        assert_eq!(traces.get(&b), Some(1.0));

        let keys: Vec<BoardKey> = traces.iter_mut().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![a, b], "first-visit order");
    }

    #[test]
    fn test_choice_restores_state() {
        let mut agent = seeded(1, 0.0);
        let mut state = GameState::tic_tac_toe();
        state.execute(4);
        let before = state.clone();
        let action = agent.choice(&mut state);
        assert!(state.is_legal(action));
        assert_eq!(state, before);
    }

    #[test]
    fn test_greedy_choice_follows_values() {
        let mut agent = seeded(2, 0.0);
        let mut state = GameState::tic_tac_toe();
        for action in state.legal_actions() {
            state.execute(action);
            agent.values.set(state.key(), if action == 6 { 0.9 } else { 0.0 });
            state.undo(action);
        }
        assert_eq!(state.turn(), Player::X);
        assert_eq!(agent.choice(&mut state), 6);

        // O minimises the same table.
        state.execute(0);
        for action in state.legal_actions() {
            state.execute(action);
            agent.values.set(state.key(), if action == 8 { -0.9 } else { 0.0 });
            state.undo(action);
        }
        assert_eq!(agent.choice(&mut state), 8);
    }

    #[test]
    fn test_terminal_value_is_pinned_to_outcome() {
        let mut agent = seeded(3, 0.3);
        let mut state = GameState::tic_tac_toe();
        agent.train_single_game(&mut state);
        assert!(state.is_terminal());
        let expected = terminal_value(&state);
        assert_eq!(agent.values().get(&state.key()), Some(expected));
    }

    #[test]
    fn test_one_loss_per_ply() {
        let mut agent = seeded(4, 0.2);
        let mut state = GameState::tic_tac_toe();
        let losses = agent.train_single_game(&mut state);
        assert_eq!(losses.len(), state.ply());
    }

    #[test]
    fn test_seeded_training_repeats() {
        let mut a = seeded(5, 0.2);
        let mut b = seeded(5, 0.2);
        let mut state = GameState::tic_tac_toe();
        let la = a.train(&mut state, 100, &DecayConfig::none(), false);
        let lb = b.train(&mut state, 100, &DecayConfig::none(), false);
        assert_eq!(la, lb);
        assert_eq!(a.table_len(), b.table_len());
        assert!(a.table_len() <= 5_478);
    }
}
