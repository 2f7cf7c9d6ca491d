use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::game::{BoardKey, GameOutcome, GameState, Player};

use super::agent::{make_rng, Policy};

/// Static value at the search horizon: a crude lean toward the side to move.
const HORIZON_VALUE: f64 = 0.5;

/// Search configuration.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Plies searched from the root, counting the root move. Unbounded if absent.
    pub depth: Option<usize>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    /// Exhaustive minimax.
    Minimax,
    /// Fail-hard alpha-beta pruning.
    AlphaBeta,
}

/// Value of a finished game: +1 X won, -1 O won, 0 draw.
pub fn terminal_value(state: &GameState) -> f64 {
    state.outcome().map(GameOutcome::value).unwrap_or(0.0)
}

/// Minimax / alpha-beta player over the shared reversible state.
///
/// Every child is explored with `execute`, evaluated, and `undo`ne before the
/// next sibling, including when a cutoff breaks the loop.
pub struct SearchAgent {
    kind: SearchKind,
    depth: Option<usize>,
    name: String,
    rng: StdRng,
    nodes: u64,
}

impl SearchAgent {
    pub fn new(kind: SearchKind, config: &SearchConfig) -> Self {
        if let Some(depth) = config.depth {
            assert!(depth > 0, "search depth must be at least 1");
        }
        let base = match kind {
            SearchKind::Minimax => "Minimax",
            SearchKind::AlphaBeta => "Prun",
        };
        let name = match config.depth {
            Some(depth) => format!("{base}{depth}"),
            None => base.to_string(),
        };
        SearchAgent {
            kind,
            depth: config.depth,
            name,
            rng: make_rng(config.seed),
            nodes: 0,
        }
    }

    pub fn minimax() -> Self {
        Self::new(SearchKind::Minimax, &SearchConfig::default())
    }

    pub fn alpha_beta() -> Self {
        Self::new(SearchKind::AlphaBeta, &SearchConfig::default())
    }

    /// Depth-limited alpha-beta, the only searcher usable on the gravity board.
    pub fn alpha_beta_depth(depth: usize) -> Self {
        Self::new(
            SearchKind::AlphaBeta,
            &SearchConfig {
                depth: Some(depth),
                seed: None,
            },
        )
    }

    pub fn kind(&self) -> SearchKind {
        self.kind
    }

    pub fn depth(&self) -> Option<usize> {
        self.depth
    }

    /// Nodes visited by the last `choice` or `evaluate` call.
    pub fn nodes_visited(&self) -> u64 {
        self.nodes
    }

    /// Value of `state` searched to the configured depth.
    pub fn evaluate(&mut self, state: &mut GameState) -> f64 {
        self.nodes = 0;
        self.phi(state, self.depth, f64::NEG_INFINITY, f64::INFINITY)
    }

    fn best_move(&mut self, state: &mut GameState) -> usize {
        let mut legal = state.legal_actions();
        assert!(!legal.is_empty(), "No legal actions available");
        legal.shuffle(&mut self.rng);

        self.nodes = 0;
        let maximizing = state.turn() == Player::X;
        let child_depth = self.depth.map(|d| d - 1);
        let mut alpha = f64::NEG_INFINITY;
        let mut beta = f64::INFINITY;

        let mut best_action = legal[0];
        let mut best_value = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };

        for &action in &legal {
            state.execute(action);
            let value = self.phi(state, child_depth, alpha, beta);
            state.undo(action);

            let improves = if maximizing {
                value > best_value
            } else {
                value < best_value
            };
            if improves {
                best_value = value;
                best_action = action;
            }

            if self.kind == SearchKind::AlphaBeta {
                if maximizing {
                    alpha = alpha.max(value);
                } else {
                    beta = beta.min(value);
                }
                if alpha >= beta {
                    break;
                }
            }
        }

        best_action
    }

    fn phi(&mut self, state: &mut GameState, depth: Option<usize>, mut alpha: f64, mut beta: f64) -> f64 {
        self.nodes += 1;

        if state.is_terminal() {
            return terminal_value(state);
        }

        if depth == Some(0) {
            return match state.turn() {
                Player::X => HORIZON_VALUE,
                Player::O => -HORIZON_VALUE,
            };
        }

        let child_depth = depth.map(|d| d - 1);
        let maximizing = state.turn() == Player::X;
        let mut best = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };

        for action in state.legal_actions() {
            state.execute(action);
            let value = self.phi(state, child_depth, alpha, beta);
            state.undo(action);

            if maximizing {
                best = best.max(value);
            } else {
                best = best.min(value);
            }

            if self.kind == SearchKind::AlphaBeta {
                if maximizing {
                    alpha = alpha.max(value);
                } else {
                    beta = beta.min(value);
                }
                if alpha >= beta {
                    break;
                }
            }
        }

        best
    }
}

impl Policy for SearchAgent {
    fn choice(&mut self, state: &mut GameState) -> usize {
        self.best_move(state)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Shape of a full (or pruned) game-tree traversal.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TreeInfo {
    /// Minimax value of the root.
    pub value: f64,
    /// Nodes visited, root and leaves included.
    pub nodes: u64,
    /// Terminal positions visited.
    pub leaves: u64,
    /// Distinct boards visited.
    pub boards: usize,
}

/// Traverse the tree below `state` in legal-action order, with or without
/// alpha-beta cutoffs, and report its size.
pub fn tree_info(state: &mut GameState, prune: bool) -> TreeInfo {
    let mut values = HashMap::new();
    let (value, nodes, leaves) = walk(
        state,
        &mut values,
        f64::NEG_INFINITY,
        f64::INFINITY,
        prune,
    );
    TreeInfo {
        value,
        nodes,
        leaves,
        boards: values.len(),
    }
}

fn walk(
    state: &mut GameState,
    values: &mut HashMap<BoardKey, f64>,
    mut alpha: f64,
    mut beta: f64,
    prune: bool,
) -> (f64, u64, u64) {
    if state.is_terminal() {
        let value = terminal_value(state);
        values.insert(state.key(), value);
        return (value, 1, 1);
    }

    let maximizing = state.turn() == Player::X;
    let mut best = if maximizing {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    };
    let mut nodes = 0;
    let mut leaves = 0;

    for action in state.legal_actions() {
        state.execute(action);
        let (value, n, l) = walk(state, values, alpha, beta, prune);
        state.undo(action);

        nodes += n;
        leaves += l;
        if maximizing {
            best = best.max(value);
            alpha = alpha.max(value);
        } else {
            best = best.min(value);
            beta = beta.min(value);
        }
        if prune && alpha >= beta {
            break;
        }
    }

    values.insert(state.key(), best);
    (best, nodes + 1, leaves)
}
