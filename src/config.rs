use std::path::Path;

use crate::ai::{QLearningConfig, SearchConfig, TdLambdaConfig, ValueConfig};
use crate::error::ConfigError;
use crate::game::{GameState, Topology, MAX_CELLS};
use crate::training::episode::EvaluationConfig;
use crate::training::trainer::DecayConfig;

/// Which board to play on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    TicTacToe,
    ConnectFour,
}

/// Board selection. `rows` and `columns` only apply to the gravity board.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub kind: GameKind,
    pub rows: usize,
    pub columns: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            kind: GameKind::TicTacToe,
            rows: 6,
            columns: 7,
        }
    }
}

impl GameConfig {
    pub fn topology(&self) -> Topology {
        match self.kind {
            GameKind::TicTacToe => Topology::TicTacToe,
            GameKind::ConnectFour => Topology::ConnectFour {
                rows: self.rows,
                cols: self.columns,
            },
        }
    }

    /// Fresh game state for the configured board.
    pub fn state(&self) -> GameState {
        GameState::new(self.topology())
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub q_learning: QLearningConfig,
    pub td_lambda: TdLambdaConfig,
    pub value: ValueConfig,
    pub search: SearchConfig,
    pub evaluation: EvaluationConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game.kind == GameKind::ConnectFour {
            if self.game.rows == 0 || self.game.columns == 0 {
                return Err(ConfigError::Validation(
                    "game.rows and game.columns must be > 0".into(),
                ));
            }
            if self.game.rows * self.game.columns > MAX_CELLS {
                return Err(ConfigError::Validation(format!(
                    "game board must have at most {MAX_CELLS} cells"
                )));
            }
            if self.search.depth.is_none() {
                return Err(ConfigError::Validation(
                    "search.depth is required for connect_four".into(),
                ));
            }
        }
        if self.search.depth == Some(0) {
            return Err(ConfigError::Validation("search.depth must be > 0".into()));
        }

        let q = &self.q_learning;
        check_rate("q_learning.alpha", q.alpha)?;
        check_unit("q_learning.epsilon", q.epsilon)?;
        check_unit("q_learning.gamma", q.gamma)?;
        check_episodes("q_learning.episodes", q.episodes)?;
        check_decay("q_learning.decay", &q.decay)?;

        let td = &self.td_lambda;
        check_rate("td_lambda.alpha", td.alpha)?;
        check_unit("td_lambda.epsilon", td.epsilon)?;
        check_unit("td_lambda.gamma", td.gamma)?;
        check_unit("td_lambda.lambda", td.lambda)?;
        check_episodes("td_lambda.episodes", td.episodes)?;
        check_decay("td_lambda.decay", &td.decay)?;

        let v = &self.value;
        check_rate("value.learning_rate", v.learning_rate)?;
        check_unit("value.epsilon", v.epsilon)?;
        check_unit("value.gamma", v.gamma)?;
        check_episodes("value.episodes", v.episodes)?;
        check_decay("value.decay", &v.decay)?;
        if v.hidden_dim == 0 {
            return Err(ConfigError::Validation(
                "value.hidden_dim must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}

fn check_rate(name: &str, value: f64) -> Result<(), ConfigError> {
    if value <= 0.0 {
        return Err(ConfigError::Validation(format!("{name} must be > 0")));
    }
    Ok(())
}

fn check_unit(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Validation(format!("{name} must be in [0, 1]")));
    }
    Ok(())
}

fn check_episodes(name: &str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Validation(format!("{name} must be > 0")));
    }
    Ok(())
}

fn check_decay(name: &str, decay: &DecayConfig) -> Result<(), ConfigError> {
    if decay.learning_rate_decay_factor <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "{name}.learning_rate_decay_factor must be > 0"
        )));
    }
    if decay.exploration_decay_factor <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "{name}.exploration_decay_factor must be > 0"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().expect("default config should be valid");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[q_learning]
alpha = 0.1
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert!((config.q_learning.alpha - 0.1).abs() < 1e-9);
        // Other fields should be defaults
        assert!((config.q_learning.gamma - 0.9).abs() < 1e-9);
        assert_eq!(config.q_learning.decay.decay_every_n_episodes, 20_000);
        assert_eq!(config.td_lambda.episodes, 100_000);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.game.kind, GameKind::TicTacToe);
        assert_eq!(config.value.hidden_dim, 58);
        assert_eq!(config.search.depth, None);
        assert_eq!(config.evaluation.games_per_pair, 100);
    }

    #[test]
    fn test_nested_decay_section() {
        let toml_str = r#"
[value.decay]
decrease_exploration = true
decay_every_n_episodes = 0
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert!(config.value.decay.decrease_exploration);
        assert!(config.value.decay.decrease_learning_rate);
        assert_eq!(config.value.decay.decay_every_n_episodes, 0);
        config.validate().unwrap();
    }

    #[test]
    fn test_gravity_board_topology() {
        let toml_str = r#"
[game]
kind = "connect_four"
rows = 5
columns = 6

[search]
depth = 4
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        config.validate().unwrap();
        assert_eq!(config.game.topology(), Topology::ConnectFour { rows: 5, cols: 6 });
        assert_eq!(config.game.state().legal_actions().len(), 6);
    }

    #[test]
    fn test_validation_requires_depth_on_gravity_board() {
        let mut config = AppConfig::default();
        config.game.kind = GameKind::ConnectFour;
        assert!(config.validate().is_err());
        config.search.depth = Some(3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_oversized_board() {
        let mut config = AppConfig::default();
        config.game.kind = GameKind::ConnectFour;
        config.game.rows = 9;
        config.game.columns = 9;
        config.search.depth = Some(3);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_depth() {
        let mut config = AppConfig::default();
        config.search.depth = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_negative_lr() {
        let mut config = AppConfig::default();
        config.value.learning_rate = -0.001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_invalid_gamma() {
        let mut config = AppConfig::default();
        config.td_lambda.gamma = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_invalid_lambda() {
        let mut config = AppConfig::default();
        config.td_lambda.lambda = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_epsilon_out_of_range() {
        let mut config = AppConfig::default();
        config.q_learning.epsilon = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_decay_factor() {
        let mut config = AppConfig::default();
        config.td_lambda.decay.learning_rate_decay_factor = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_hidden_dim() {
        let mut config = AppConfig::default();
        config.value.hidden_dim = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("nonexistent_config.toml")).unwrap();
        assert_eq!(config.q_learning.episodes, 200_000);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
[td_lambda]
episodes = 500
seed = 3
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.td_lambda.episodes, 500);
        assert_eq!(config.td_lambda.seed, Some(3));
        // Others are defaults
        assert!((config.value.learning_rate - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[value]\nhidden_dim = 0\n").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Validation(_))
        ));

        std::fs::write(&path, "[value\n").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let toml_str = AppConfig::default_toml();
        let config: AppConfig = toml::from_str(&toml_str).unwrap();
        config.validate().expect("roundtripped config should be valid");
        assert_eq!(config.value.decay, DecayConfig::every(7_000));
    }
}
