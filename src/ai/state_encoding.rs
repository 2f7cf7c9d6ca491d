use burn::prelude::*;
use burn::tensor::TensorData;

use crate::game::{Board, Cell, GameState, Player, Topology};

/// Features per cell: one-hot over {X, O, Empty}.
pub const CELL_FEATURES: usize = 3;
/// Trailing one-hot of the side to move.
pub const TURN_FEATURES: usize = 2;

/// Length of the encoded vector for a board topology.
pub fn input_dim(topology: Topology) -> usize {
    CELL_FEATURES * topology.capacity() + TURN_FEATURES
}

/// Encode a position as a flat `[3 * cells + 2]` vector.
///
/// Cells are taken in row-major order, each as `[1,0,0]` for X, `[0,1,0]` for
/// O and `[0,0,1]` for empty, followed by `[1,0]` when X is to move and
/// `[0,1]` when O is.
pub fn encode_position(board: &Board, turn: Player) -> Vec<f32> {
    let mut data = Vec::with_capacity(CELL_FEATURES * board.len() + TURN_FEATURES);
    for &cell in board.cells() {
        let one_hot = match cell {
            Cell::X => [1.0, 0.0, 0.0],
            Cell::O => [0.0, 1.0, 0.0],
            Cell::Empty => [0.0, 0.0, 1.0],
        };
        data.extend_from_slice(&one_hot);
    }
    match turn {
        Player::X => data.extend_from_slice(&[1.0, 0.0]),
        Player::O => data.extend_from_slice(&[0.0, 1.0]),
    }
    data
}

/// Encode a game state as a `[1, input_dim]` tensor.
pub fn encode_state<B: Backend>(state: &GameState, device: &B::Device) -> Tensor<B, 2> {
    encode_positions_batch(&[(state.board(), state.turn())], device)
}

/// Encode several positions as a `[batch, input_dim]` tensor.
///
/// All positions must share one topology.
pub fn encode_positions_batch<B: Backend>(
    positions: &[(&Board, Player)],
    device: &B::Device,
) -> Tensor<B, 2> {
    assert!(!positions.is_empty(), "cannot encode an empty batch");
    let dim = CELL_FEATURES * positions[0].0.len() + TURN_FEATURES;
    let mut flat = Vec::with_capacity(positions.len() * dim);
    for (board, turn) in positions {
        let row = encode_position(board, *turn);
        debug_assert_eq!(row.len(), dim, "mixed topologies in one batch");
        flat.extend_from_slice(&row);
    }
    Tensor::from_data(TensorData::new(flat, [positions.len(), dim]), device)
}
