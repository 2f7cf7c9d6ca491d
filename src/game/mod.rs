//! Core game logic for the two supported boards: cells and keys, players, win
//! detection, and the reversible game state shared by every strategy.

mod board;
pub mod lines;
mod player;
mod state;

pub use board::{Board, BoardKey, Cell, MAX_CELLS};
pub use player::Player;
pub use state::{GameOutcome, GameState, Topology};
