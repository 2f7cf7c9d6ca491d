use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game::{GameState, Player};
use crate::training::trainer::{DecayConfig, Trainer, TrainerConfig};

/// Anything that can pick a move.
///
/// `choice` may walk the state forward and back with `execute` / `undo` while
/// it deliberates, but must hand it back exactly as it received it.
pub trait Policy {
    /// Select a legal action for the player to move.
    fn choice(&mut self, state: &mut GameState) -> usize;

    /// Return the strategy's display name.
    fn name(&self) -> &str;
}

/// Saved exploration rate for enter/exit eval mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalState {
    pub epsilon: f64,
}

/// Extension trait for strategies that learn from self-play.
pub trait Trainable: Policy {
    fn epsilon(&self) -> f64;
    fn set_epsilon(&mut self, epsilon: f64);
    fn learning_rate(&self) -> f64;
    fn set_learning_rate(&mut self, learning_rate: f64);

    /// Play one self-play game from a reset state and learn from it.
    /// Returns the losses of the individual updates.
    fn train_single_game(&mut self, state: &mut GameState) -> Vec<f64>;

    /// Run `episodes` self-play games with periodic decay.
    /// Returns the mean loss of each episode.
    fn train(
        &mut self,
        state: &mut GameState,
        episodes: usize,
        decay: &DecayConfig,
        verbose: bool,
    ) -> Vec<f64> {
        let trainer = Trainer::new(TrainerConfig {
            episodes,
            decay: decay.clone(),
            verbose,
        });
        trainer.train(self, state)
    }

    /// Enter eval mode (epsilon = 0). Returns state to restore.
    fn enter_eval_mode(&mut self) -> EvalState {
        let saved = EvalState {
            epsilon: self.epsilon(),
        };
        self.set_epsilon(0.0);
        saved
    }

    /// Exit eval mode, restoring previous state.
    fn exit_eval_mode(&mut self, state: EvalState) {
        self.set_epsilon(state.epsilon);
    }
}

/// Seeded when a seed is given, from the OS otherwise.
pub(crate) fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Uniform pick among the legal actions.
pub(crate) fn random_action(rng: &mut StdRng, legal: &[usize]) -> usize {
    assert!(!legal.is_empty(), "No legal actions available");
    legal[rng.random_range(0..legal.len())]
}

/// Best scored action for `player`: highest score for X, lowest for O.
/// Ties keep the first candidate seen.
pub(crate) fn greedy_action(
    player: Player,
    scored: impl IntoIterator<Item = (usize, f64)>,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (action, score) in scored {
        let better = match best {
            None => true,
            Some((_, current)) => match player {
                Player::X => score > current,
                Player::O => score < current,
            },
        };
        if better {
            best = Some((action, score));
        }
    }
    best
}
