use rand::rngs::StdRng;
use rand::Rng;

use crate::ai::Policy;
use crate::game::{GameState, Player};
use crate::training::metrics::ScoreTable;

/// Round-robin evaluation settings.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Games for every ordered (X, O) pairing.
    pub games_per_pair: usize,
    /// Open every game with a uniformly random move.
    pub first_action_random: bool,
    pub seed: Option<u64>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        EvaluationConfig {
            games_per_pair: 100,
            first_action_random: true,
            seed: None,
        }
    }
}

/// Play one game from a reset state between `players[x]` (X) and
/// `players[o]` (O); `x == o` lets a policy play itself. Returns the winner.
pub fn play_game(
    state: &mut GameState,
    players: &mut [Box<dyn Policy>],
    x: usize,
    o: usize,
    first_action_random: bool,
    rng: &mut StdRng,
) -> Option<Player> {
    state.reset();

    if first_action_random {
        let legal = state.legal_actions();
        let action = legal[rng.random_range(0..legal.len())];
        state.execute(action);
    }

    while !state.is_terminal() {
        let index = match state.turn() {
            Player::X => x,
            Player::O => o,
        };
        let action = players[index].choice(state);
        assert!(
            state.is_legal(action),
            "{} selected illegal action {} (legal: {:?})",
            players[index].name(),
            action,
            state.legal_actions()
        );
        state.execute(action);
    }

    state.winner()
}

/// Every policy plays every policy, itself included, `games_per_pair` times
/// on each side of the board.
pub fn evaluation(
    state: &mut GameState,
    players: &mut [Box<dyn Policy>],
    config: &EvaluationConfig,
    rng: &mut StdRng,
) -> ScoreTable {
    let mut table = ScoreTable::new();
    for x in 0..players.len() {
        for o in 0..players.len() {
            let x_name = players[x].name().to_string();
            let o_name = players[o].name().to_string();
            for _ in 0..config.games_per_pair {
                let winner = play_game(state, players, x, o, config.first_action_random, rng);
                table.record(&x_name, &o_name, winner);
            }
            if let Some(score) = table.get(&x_name, &o_name) {
                log::debug!(
                    "{x_name} vs {o_name}: x {} | o {} | draw {}",
                    score.x_wins,
                    score.o_wins,
                    score.draws
                );
            }
        }
    }
    table
}
