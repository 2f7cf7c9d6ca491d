use crate::ai::Trainable;
use crate::game::{GameState, Player};
use crate::training::metrics::{EpisodeResult, TrainingMetrics};

/// Periodic multiplicative decay of the learning rate and exploration rate.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    pub decrease_learning_rate: bool,
    pub learning_rate_decay_factor: f64,
    pub decrease_exploration: bool,
    pub exploration_decay_factor: f64,
    /// Decay cadence in episodes; 0 never decays.
    pub decay_every_n_episodes: usize,
}

impl DecayConfig {
    /// Learning rate x0.8 every `n` episodes, exploration left alone.
    pub fn every(n: usize) -> Self {
        DecayConfig {
            decrease_learning_rate: true,
            learning_rate_decay_factor: 0.8,
            decrease_exploration: false,
            exploration_decay_factor: 0.9,
            decay_every_n_episodes: n,
        }
    }

    /// No decay at all.
    pub fn none() -> Self {
        DecayConfig {
            decrease_learning_rate: false,
            decrease_exploration: false,
            decay_every_n_episodes: 0,
            ..Self::every(0)
        }
    }

    fn is_due(&self, episode: usize) -> bool {
        self.decay_every_n_episodes > 0 && episode % self.decay_every_n_episodes == 0
    }
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self::every(10_000)
    }
}

/// Trainer configuration.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    pub episodes: usize,
    pub decay: DecayConfig,
    pub verbose: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            episodes: 10_000,
            decay: DecayConfig::default(),
            verbose: false,
        }
    }
}

/// Self-play trainer for any learning strategy.
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Trainer { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Run the full training loop. Returns the mean update loss of every
    /// episode, in order.
    pub fn train<L: Trainable + ?Sized>(&self, learner: &mut L, state: &mut GameState) -> Vec<f64> {
        let episodes = self.config.episodes;
        let decay = &self.config.decay;
        let verbose = self.config.verbose;
        let log_interval = (episodes / 10).max(1);
        let mut metrics = TrainingMetrics::with_capacity(log_interval);
        let mut losses = Vec::with_capacity(episodes);

        if verbose {
            log::info!(
                "Starting {} training on {} for {} episodes",
                learner.name(),
                state.topology().name(),
                episodes
            );
            log::info!(
                "learning rate: {} | decrease: {} x{} | epsilon: {} | decrease: {} x{} | every {} episodes",
                learner.learning_rate(),
                decay.decrease_learning_rate,
                decay.learning_rate_decay_factor,
                learner.epsilon(),
                decay.decrease_exploration,
                decay.exploration_decay_factor,
                decay.decay_every_n_episodes,
            );
        }

        for episode in 1..=episodes {
            let episode_losses = learner.train_single_game(state);
            let loss = mean(&episode_losses);
            losses.push(loss);
            metrics.record_episode(
                EpisodeResult {
                    winner: state.winner(),
                    game_length: state.ply(),
                },
                loss,
            );

            if decay.is_due(episode) {
                if decay.decrease_learning_rate {
                    learner.set_learning_rate(learner.learning_rate() * decay.learning_rate_decay_factor);
                }
                if decay.decrease_exploration {
                    learner.set_epsilon(learner.epsilon() * decay.exploration_decay_factor);
                }
                if verbose {
                    log::info!(
                        "{} games completed | new learning rate: {:.3} | new epsilon: {:.3}",
                        episode,
                        learner.learning_rate(),
                        learner.epsilon()
                    );
                }
            } else if verbose && episode % log_interval == 0 {
                log::info!(
                    "{} games completed | loss: {:.4} | x: {:.1}% | o: {:.1}% | draw: {:.1}% | avg_len: {:.1}",
                    episode,
                    metrics.average_loss(log_interval),
                    metrics.win_rate(Player::X, log_interval) * 100.0,
                    metrics.win_rate(Player::O, log_interval) * 100.0,
                    metrics.draw_rate(log_interval) * 100.0,
                    metrics.average_game_length(log_interval),
                );
            }
        }

        if verbose {
            log::info!("Training complete. Total episodes: {}", metrics.total_episodes());
        }
        losses
    }
}

/// Mean of a loss list, 0 for an empty one.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
