/// Largest board whose base-3 key still fits in a `u128`.
pub const MAX_CELLS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    fn digit(self) -> u128 {
        match self {
            Cell::Empty => 0,
            Cell::X => 1,
            Cell::O => 2,
        }
    }
}

/// Compact, hashable identity of a board: the cells packed as base-3 digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoardKey(u128);

impl BoardKey {
    pub fn raw(self) -> u128 {
        self.0
    }
}

/// Row-major grid of cells. Row 0 is the top.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "board must have at least one cell");
        assert!(
            rows * cols <= MAX_CELLS,
            "board of {rows}x{cols} exceeds {MAX_CELLS} cells"
        );
        Board {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells on the board.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&c| c == Cell::Empty)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Get the cell at a specific position
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.cols + col]
    }

    /// Get the cell at a row-major index
    pub fn cell(&self, index: usize) -> Cell {
        self.cells[index]
    }

    pub(crate) fn set(&mut self, index: usize, cell: Cell) {
        self.cells[index] = cell;
    }

    /// Number of occupied cells
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|&&c| c != Cell::Empty).count()
    }

    /// Check if a column is full
    pub fn is_column_full(&self, col: usize) -> bool {
        if col >= self.cols {
            return true;
        }
        self.get(0, col) != Cell::Empty
    }

    /// Lowest empty row in a column, where a dropped piece would land.
    pub fn landing_row(&self, col: usize) -> Option<usize> {
        if col >= self.cols {
            return None;
        }
        (0..self.rows).rev().find(|&row| self.get(row, col) == Cell::Empty)
    }

    /// Topmost occupied row in a column.
    pub fn top_row(&self, col: usize) -> Option<usize> {
        if col >= self.cols {
            return None;
        }
        (0..self.rows).find(|&row| self.get(row, col) != Cell::Empty)
    }

    /// Drop a piece in a column, returns the row where it landed
    pub fn drop_piece(&mut self, col: usize, cell: Cell) -> Option<usize> {
        let row = self.landing_row(col)?;
        self.cells[row * self.cols + col] = cell;
        Some(row)
    }

    /// Remove the topmost piece of a column, returns the row it left
    pub fn lift_piece(&mut self, col: usize) -> Option<usize> {
        let row = self.top_row(col)?;
        self.cells[row * self.cols + col] = Cell::Empty;
        Some(row)
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&c| c != Cell::Empty)
    }

    pub fn key(&self) -> BoardKey {
        let packed = self
            .cells
            .iter()
            .rev()
            .fold(0u128, |acc, &cell| acc * 3 + cell.digit());
        BoardKey(packed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(6, 7);
        for row in 0..6 {
            for col in 0..7 {
                assert_eq!(board.get(row, col), Cell::Empty);
            }
        }
        assert!(board.is_empty());
        assert_eq!(board.occupied(), 0);
    }

    #[test]
    fn test_drop_piece() {
        let mut board = Board::new(6, 7);

        // Drop first piece in column 3
        let row = board.drop_piece(3, Cell::X).unwrap();
        assert_eq!(row, 5); // Should land at bottom
        assert_eq!(board.get(5, 3), Cell::X);

        // Drop second piece in same column
        let row = board.drop_piece(3, Cell::O).unwrap();
        assert_eq!(row, 4); // Should land on top of first piece
        assert_eq!(board.get(4, 3), Cell::O);
    }

    #[test]
    fn test_lift_piece_takes_topmost() {
        let mut board = Board::new(6, 7);
        board.drop_piece(2, Cell::X).unwrap();
        board.drop_piece(2, Cell::O).unwrap();

        assert_eq!(board.lift_piece(2), Some(4));
        assert_eq!(board.get(4, 2), Cell::Empty);
        assert_eq!(board.get(5, 2), Cell::X);
        assert_eq!(board.lift_piece(2), Some(5));
        assert_eq!(board.lift_piece(2), None);
    }

    #[test]
    fn test_column_full() {
        let mut board = Board::new(6, 7);

        // Fill column 0
        for _ in 0..6 {
            board.drop_piece(0, Cell::X).unwrap();
        }

        assert!(board.is_column_full(0));
        assert_eq!(board.drop_piece(0, Cell::O), None);
    }

    #[test]
    fn test_invalid_column() {
        let mut board = Board::new(6, 7);
        assert_eq!(board.drop_piece(7, Cell::X), None);
        assert!(board.is_column_full(7));
    }

    #[test]
    fn test_full_board() {
        let mut board = Board::new(6, 7);
        for col in 0..7 {
            for _ in 0..6 {
                board.drop_piece(col, Cell::X).unwrap();
            }
        }
        assert!(board.is_full());
    }

    #[test]
    fn test_key_distinguishes_owners_and_positions() {
        let empty = Board::new(3, 3);
        let mut x_corner = Board::new(3, 3);
        x_corner.set(0, Cell::X);
        let mut o_corner = Board::new(3, 3);
        o_corner.set(0, Cell::O);
        let mut x_center = Board::new(3, 3);
        x_center.set(4, Cell::X);

        let keys = [empty.key(), x_corner.key(), o_corner.key(), x_center.key()];
        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                assert_ne!(keys[i], keys[j], "keys {i} and {j} collide");
            }
        }
        assert_eq!(empty.key().raw(), 0);
    }

    #[test]
    fn test_key_fits_largest_board() {
        let mut board = Board::new(8, 10);
        for index in 0..board.len() {
            board.set(index, Cell::O);
        }
        // 3^80 - 1 still fits.
        assert_eq!(board.key().raw(), 3u128.pow(80) - 1);
    }
}
