#![recursion_limit = "256"]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use ml_board_games::ai::{
    Policy, QLearningAgent, SearchAgent, SearchKind, TdLambdaAgent, Trainable, ValueAgent,
};
use ml_board_games::config::AppConfig;
use ml_board_games::game::GameState;
use ml_board_games::training::episode::evaluation;
use ml_board_games::training::metrics::ScoreTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Strategy {
    /// Double-table Q-learning
    Q,
    /// TD(λ) with eligibility traces
    Td,
    /// Feed-forward value approximator
    Value,
}

/// Train a learning strategy by self-play.
#[derive(Parser)]
#[command(name = "train", about = "Train a board game strategy by self-play")]
struct Cli {
    /// Strategy to train
    #[arg(long, value_enum, default_value = "q")]
    strategy: Strategy,

    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override number of training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Play a round-robin against alpha-beta search after training
    #[arg(long)]
    evaluate: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Only log warnings and errors
    #[arg(long)]
    quiet: bool,

    /// Print a config file with all default values and exit
    #[arg(long)]
    print_default_config: bool,
}

#[derive(Debug, Serialize)]
struct TrainingSummary {
    strategy: String,
    game: String,
    episodes: usize,
    learning_rate: f64,
    epsilon: f64,
    /// Mean loss over the last tenth of the run.
    final_loss: f64,
    table_entries: Option<usize>,
    scores: Option<ScoreTable>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if cli.print_default_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(episodes) = cli.episodes {
        if episodes == 0 {
            bail!("--episodes must be > 0");
        }
        match cli.strategy {
            Strategy::Q => config.q_learning.episodes = episodes,
            Strategy::Td => config.td_lambda.episodes = episodes,
            Strategy::Value => config.value.episodes = episodes,
        }
    }

    let mut state = config.game.state();
    let verbose = !cli.quiet;

    let (mut summary, learner): (TrainingSummary, Box<dyn Policy>) = match cli.strategy {
        Strategy::Q => {
            let mut agent = QLearningAgent::new(&config.q_learning);
            let losses = agent.train(
                &mut state,
                config.q_learning.episodes,
                &config.q_learning.decay,
                verbose,
            );
            let mut summary = summarize(&agent, &state, &losses);
            summary.table_entries = Some(agent.table_len());
            agent.enter_eval_mode();
            (summary, Box::new(agent) as Box<dyn Policy>)
        }
        Strategy::Td => {
            let mut agent = TdLambdaAgent::new(&config.td_lambda);
            let losses = agent.train(
                &mut state,
                config.td_lambda.episodes,
                &config.td_lambda.decay,
                verbose,
            );
            let mut summary = summarize(&agent, &state, &losses);
            summary.table_entries = Some(agent.table_len());
            agent.enter_eval_mode();
            (summary, Box::new(agent) as Box<dyn Policy>)
        }
        Strategy::Value => {
            let mut agent = ValueAgent::new(config.game.topology(), &config.value);
            let losses = agent.train(
                &mut state,
                config.value.episodes,
                &config.value.decay,
                verbose,
            );
            let summary = summarize(&agent, &state, &losses);
            agent.enter_eval_mode();
            (summary, Box::new(agent) as Box<dyn Policy>)
        }
    };

    if cli.evaluate {
        let searcher = SearchAgent::new(SearchKind::AlphaBeta, &config.search);
        let mut players: Vec<Box<dyn Policy>> = vec![learner, Box::new(searcher)];
        let mut rng = match config.evaluation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        log::info!(
            "Evaluating {} games per pairing on {}",
            config.evaluation.games_per_pair,
            summary.game
        );
        let scores = evaluation(&mut state, &mut players, &config.evaluation, &mut rng);
        for (x, o, score) in scores.iter() {
            log::info!(
                "x: {:<8} o: {:<8} | x wins {:>5} | o wins {:>5} | draws {:>5}",
                x,
                o,
                score.x_wins,
                score.o_wins,
                score.draws
            );
        }
        summary.scores = Some(scores);
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&summary).context("serializing summary")?;
        println!("{json}");
    } else {
        log::info!(
            "{} on {}: {} episodes, final loss {:.4}",
            summary.strategy,
            summary.game,
            summary.episodes,
            summary.final_loss
        );
    }

    Ok(())
}

fn summarize<L: Trainable>(agent: &L, state: &GameState, losses: &[f64]) -> TrainingSummary {
    let tail = (losses.len() / 10).max(1).min(losses.len());
    let final_loss = if tail == 0 {
        0.0
    } else {
        losses[losses.len() - tail..].iter().sum::<f64>() / tail as f64
    };
    TrainingSummary {
        strategy: agent.name().to_string(),
        game: state.topology().name(),
        episodes: losses.len(),
        learning_rate: agent.learning_rate(),
        epsilon: agent.epsilon(),
        final_loss,
        table_entries: None,
        scores: None,
    }
}
