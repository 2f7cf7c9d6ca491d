use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

use crate::game::Player;

/// Result of a single episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeResult {
    pub winner: Option<Player>,
    pub game_length: usize,
}

/// Training metrics tracker with rolling window computations.
pub struct TrainingMetrics {
    episode_results: VecDeque<EpisodeResult>,
    episode_losses: VecDeque<f64>,
    capacity: usize,
    total_episodes: usize, // lifetime count, never capped
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TrainingMetrics {
            episode_results: VecDeque::with_capacity(capacity),
            episode_losses: VecDeque::with_capacity(capacity),
            capacity,
            total_episodes: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn record_episode(&mut self, result: EpisodeResult, loss: f64) {
        self.total_episodes += 1;
        self.episode_results.push_back(result);
        if self.episode_results.len() > self.capacity {
            self.episode_results.pop_front();
        }
        self.episode_losses.push_back(loss);
        if self.episode_losses.len() > self.capacity {
            self.episode_losses.pop_front();
        }
    }

    /// Fraction of the last N episodes won by `player`.
    pub fn win_rate(&self, player: Player, last_n: usize) -> f64 {
        self.rate(last_n, |r| r.winner == Some(player))
    }

    /// Draw rate in the last N episodes.
    pub fn draw_rate(&self, last_n: usize) -> f64 {
        self.rate(last_n, |r| r.winner.is_none())
    }

    fn rate(&self, last_n: usize, pred: impl Fn(&EpisodeResult) -> bool) -> f64 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let hits = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .filter(|r| pred(r))
            .count();
        hits as f64 / n as f64
    }

    /// Average episode loss over the last N episodes.
    pub fn average_loss(&self, last_n: usize) -> f64 {
        let n = self.episode_losses.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let sum: f64 = self.episode_losses.iter().rev().take(n).sum();
        sum / n as f64
    }

    /// Average game length over the last N episodes.
    pub fn average_game_length(&self, last_n: usize) -> f64 {
        let n = self.episode_results.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = self
            .episode_results
            .iter()
            .rev()
            .take(n)
            .map(|r| r.game_length)
            .sum();
        total as f64 / n as f64
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Tally of games between one X policy and one O policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub x_wins: u32,
    pub o_wins: u32,
    pub draws: u32,
}

impl Score {
    pub fn record(&mut self, winner: Option<Player>) {
        match winner {
            Some(Player::X) => self.x_wins += 1,
            Some(Player::O) => self.o_wins += 1,
            None => self.draws += 1,
        }
    }

    pub fn games(&self) -> u32 {
        self.x_wins + self.o_wins + self.draws
    }
}

/// Round-robin results keyed by (X policy name, O policy name).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreTable {
    scores: BTreeMap<String, BTreeMap<String, Score>>,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, x: &str, o: &str, winner: Option<Player>) {
        self.scores
            .entry(x.to_string())
            .or_default()
            .entry(o.to_string())
            .or_default()
            .record(winner);
    }

    pub fn get(&self, x: &str, o: &str) -> Option<Score> {
        self.scores.get(x).and_then(|row| row.get(o)).copied()
    }

    /// All pairings as (x, o, score), ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, Score)> {
        self.scores.iter().flat_map(|(x, row)| {
            row.iter()
                .map(move |(o, score)| (x.as_str(), o.as_str(), *score))
        })
    }

    pub fn len(&self) -> usize {
        self.scores.values().map(|row| row.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(winner: Option<Player>, game_length: usize) -> EpisodeResult {
        EpisodeResult {
            winner,
            game_length,
        }
    }

    #[test]
    fn test_win_rate() {
        let mut m = TrainingMetrics::new();
        for _ in 0..7 {
            m.record_episode(result(Some(Player::X), 9), 0.0);
        }
        for _ in 0..3 {
            m.record_episode(result(Some(Player::O), 8), 0.0);
        }
        assert!((m.win_rate(Player::X, 10) - 0.7).abs() < 1e-9);
        assert!((m.win_rate(Player::O, 10) - 0.3).abs() < 1e-9);
        assert!((m.win_rate(Player::O, 3) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_draw_rate() {
        let mut m = TrainingMetrics::new();
        m.record_episode(result(None, 9), 0.0);
        m.record_episode(result(Some(Player::X), 5), 0.0);
        assert!((m.draw_rate(10) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_average_loss() {
        let mut m = TrainingMetrics::new();
        m.record_episode(result(None, 9), 1.0);
        m.record_episode(result(None, 9), 3.0);
        assert!((m.average_loss(10) - 2.0).abs() < 1e-9);
        assert!((m.average_loss(1) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_game_length() {
        let mut m = TrainingMetrics::new();
        m.record_episode(result(None, 20), 0.0);
        m.record_episode(result(None, 30), 0.0);
        assert!((m.average_game_length(10) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_is_capped() {
        let mut m = TrainingMetrics::with_capacity(3);
        for i in 0..10 {
            m.record_episode(result(None, i), i as f64);
        }
        assert_eq!(m.total_episodes(), 10);
        assert!((m.average_loss(100) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_metrics_are_zero() {
        let m = TrainingMetrics::default();
        assert_eq!(m.win_rate(Player::X, 10), 0.0);
        assert_eq!(m.average_loss(10), 0.0);
    }

    #[test]
    fn test_score_table() {
        let mut table = ScoreTable::new();
        table.record("Q", "Prun", Some(Player::O));
        table.record("Q", "Prun", None);
        table.record("Prun", "Q", Some(Player::X));
        table.record("Q", "Q", None);

        assert_eq!(
            table.get("Q", "Prun"),
            Some(Score {
                x_wins: 0,
                o_wins: 1,
                draws: 1
            })
        );
        assert_eq!(table.get("Prun", "Q").map(|s| s.x_wins), Some(1));
        assert_eq!(table.get("Prun", "Prun"), None);
        assert_eq!(table.len(), 3);

        let pairs: Vec<(&str, &str)> = table.iter().map(|(x, o, _)| (x, o)).collect();
        assert_eq!(pairs, vec![("Prun", "Q"), ("Q", "Prun"), ("Q", "Q")]);
    }

    #[test]
    fn test_score_table_serializes() {
        let mut table = ScoreTable::new();
        table.record("TD", "TD", Some(Player::X));
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["scores"]["TD"]["TD"]["x_wins"], 1);
    }
}
