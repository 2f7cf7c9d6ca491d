//! Win detection for both board topologies.

use super::board::{Board, Cell};

/// The eight winning triples of the 3×3 board (rows, columns, diagonals).
pub const TRIPLES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [6, 4, 2],
];

/// Discs in a row needed to win on the gravity board.
pub const CONNECT: usize = 4;

/// Check whether `cell` owns any of the eight triples.
pub fn has_triple(board: &Board, cell: Cell) -> bool {
    TRIPLES
        .iter()
        .any(|triple| triple.iter().all(|&i| board.cell(i) == cell))
}

/// A line direction through a placed disc. Rows grow downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    /// Top-left to bottom-right (\)
    DiagonalDown,
    /// Left to right
    Horizontal,
    /// Bottom-left to top-right (/)
    DiagonalUp,
    /// Downward from the disc only, since the disc just placed is the topmost
    Vertical,
}

pub const LINES: [Line; 4] = [
    Line::DiagonalDown,
    Line::Horizontal,
    Line::DiagonalUp,
    Line::Vertical,
];

impl Line {
    /// (row step, column step) pairs scanned away from the disc.
    fn steps(self) -> &'static [(isize, isize)] {
        match self {
            Line::DiagonalDown => &[(-1, -1), (1, 1)],
            Line::Horizontal => &[(0, -1), (0, 1)],
            Line::DiagonalUp => &[(1, -1), (-1, 1)],
            Line::Vertical => &[(1, 0)],
        }
    }
}

/// Count contiguous `cell` discs along `line` through (row, col), the disc at
/// (row, col) included. Each side scans at most `CONNECT - 1` cells.
pub fn count_line(board: &Board, cell: Cell, row: usize, col: usize, line: Line) -> usize {
    let mut count = 1;
    for &(dr, dc) in line.steps() {
        for k in 1..CONNECT as isize {
            let r = row as isize + dr * k;
            let c = col as isize + dc * k;
            if r < 0 || c < 0 || r >= board.rows() as isize || c >= board.cols() as isize {
                break;
            }
            if board.get(r as usize, c as usize) != cell {
                break;
            }
            count += 1;
        }
    }
    count
}

/// Check if the disc just placed at (row, col) completes four in a row.
pub fn has_four(board: &Board, row: usize, col: usize) -> bool {
    let cell = board.get(row, col);
    if cell == Cell::Empty {
        return false;
    }
    LINES
        .iter()
        .any(|&line| count_line(board, cell, row, col, line) >= CONNECT)
}
