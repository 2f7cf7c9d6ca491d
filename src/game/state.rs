use super::board::{Board, BoardKey, Cell};
use super::lines;
use super::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(Player),
    Draw,
}

impl GameOutcome {
    /// Game-theoretic value from X's side: +1 X won, -1 O won, 0 draw.
    pub fn value(self) -> f64 {
        match self {
            GameOutcome::Winner(Player::X) => 1.0,
            GameOutcome::Winner(Player::O) => -1.0,
            GameOutcome::Draw => 0.0,
        }
    }
}

/// Which of the two supported games a state plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// 3×3 placement board, actions are cell indices.
    TicTacToe,
    /// Gravity board, actions are columns and discs fall to the lowest empty row.
    ConnectFour { rows: usize, cols: usize },
}

impl Topology {
    pub fn rows(self) -> usize {
        match self {
            Topology::TicTacToe => 3,
            Topology::ConnectFour { rows, .. } => rows,
        }
    }

    pub fn cols(self) -> usize {
        match self {
            Topology::TicTacToe => 3,
            Topology::ConnectFour { cols, .. } => cols,
        }
    }

    /// Maximum number of plies in a game.
    pub fn capacity(self) -> usize {
        self.rows() * self.cols()
    }

    pub fn name(self) -> String {
        match self {
            Topology::TicTacToe => "TicTacToe".to_string(),
            Topology::ConnectFour { rows, cols } => format!("ConnectFour{rows}{cols}"),
        }
    }
}

/// Mutable game state with paired `execute` / `undo` transitions.
///
/// Searchers and learners share a single state and walk it forward and back
/// instead of cloning it per node. `undo(a)` is only valid directly after the
/// matching `execute(a)` (LIFO), and then restores the previous state exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    topology: Topology,
    board: Board,
    turn: Player,
    ply: usize,
    terminated: bool,
    winner: Option<Player>,
}

impl GameState {
    /// Create initial game state
    pub fn new(topology: Topology) -> Self {
        GameState {
            topology,
            board: Board::new(topology.rows(), topology.cols()),
            turn: Player::X, // X starts
            ply: 0,
            terminated: false,
            winner: None,
        }
    }

    pub fn tic_tac_toe() -> Self {
        Self::new(Topology::TicTacToe)
    }

    pub fn connect_four(rows: usize, cols: usize) -> Self {
        Self::new(Topology::ConnectFour { rows, cols })
    }

    /// Return to the empty board in place.
    pub fn reset(&mut self) {
        self.board = Board::new(self.topology.rows(), self.topology.cols());
        self.turn = Player::X;
        self.ply = 0;
        self.terminated = false;
        self.winner = None;
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Get reference to board
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Player to move
    pub fn turn(&self) -> Player {
        self.turn
    }

    /// Actions applied since reset
    pub fn ply(&self) -> usize {
        self.ply
    }

    /// Check if game is over
    pub fn is_terminal(&self) -> bool {
        self.terminated
    }

    /// Winner of a finished game; `None` for a draw or a game in progress.
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Get game outcome if game is over
    pub fn outcome(&self) -> Option<GameOutcome> {
        if !self.terminated {
            return None;
        }
        Some(match self.winner {
            Some(player) => GameOutcome::Winner(player),
            None => GameOutcome::Draw,
        })
    }

    pub fn key(&self) -> BoardKey {
        self.board.key()
    }

    /// Get list of legal actions in ascending order
    pub fn legal_actions(&self) -> Vec<usize> {
        if self.terminated {
            return Vec::new();
        }
        match self.topology {
            Topology::TicTacToe => (0..self.board.len())
                .filter(|&i| self.board.cell(i) == Cell::Empty)
                .collect(),
            Topology::ConnectFour { cols, .. } => (0..cols)
                .filter(|&col| !self.board.is_column_full(col))
                .collect(),
        }
    }

    pub fn is_legal(&self, action: usize) -> bool {
        if self.terminated {
            return false;
        }
        match self.topology {
            Topology::TicTacToe => {
                action < self.board.len() && self.board.cell(action) == Cell::Empty
            }
            Topology::ConnectFour { .. } => !self.board.is_column_full(action),
        }
    }

    /// Apply a legal action for the player to move.
    ///
    /// Panics when the action is not legal; callers choose from `legal_actions`.
    pub fn execute(&mut self, action: usize) {
        assert!(
            self.is_legal(action),
            "illegal action {action} (legal: {:?})",
            self.legal_actions()
        );
        let mark = self.turn.to_cell();

        let won = match self.topology {
            Topology::TicTacToe => {
                self.board.set(action, mark);
                lines::has_triple(&self.board, mark)
            }
            Topology::ConnectFour { .. } => {
                let row = self
                    .board
                    .drop_piece(action, mark)
                    .unwrap_or_else(|| panic!("column {action} is full"));
                lines::has_four(&self.board, row, action)
            }
        };

        if won {
            self.winner = Some(self.turn);
            self.terminated = true;
        }

        self.ply += 1;
        if self.ply == self.topology.capacity() {
            self.terminated = true;
        }

        self.turn = self.turn.other();
    }

    /// Revert the immediately preceding `execute(action)`.
    pub fn undo(&mut self, action: usize) {
        assert!(self.ply > 0, "undo({action}) with no action applied");
        self.turn = self.turn.other();
        self.ply -= 1;
        self.terminated = false;
        self.winner = None;

        let mark = self.turn.to_cell();
        match self.topology {
            Topology::TicTacToe => {
                debug_assert_eq!(self.board.cell(action), mark, "undo out of order");
                self.board.set(action, Cell::Empty);
            }
            Topology::ConnectFour { .. } => {
                debug_assert_eq!(
                    self.board.top_row(action).map(|row| self.board.get(row, action)),
                    Some(mark),
                    "undo out of order"
                );
                self.board
                    .lift_piece(action)
                    .unwrap_or_else(|| panic!("undo of empty column {action}"));
            }
        }
    }
}
