//! The settled-cell grid.
//!
//! Row 0 is the top. Pieces may hang above the board (negative rows) while
//! falling; those cells are never checked against or written into the grid.

use crate::piece::{Position, Tetromino};
use crate::shape::TetrominoType;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CellState {
    #[default]
    Empty,
    Filled(TetrominoType),
}

impl CellState {
    pub fn is_filled(&self) -> bool {
        matches!(self, CellState::Filled(_))
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    width: usize,
    height: usize,
    rows: Vec<Vec<CellState>>,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "board must be at least 1x1");
        Self {
            width,
            height,
            rows: vec![vec![CellState::Empty; width]; height],
        }
    }

    /// Builds a board from pre-filled rows, top row first.
    ///
    /// Panics if `rows` is empty or not rectangular.
    pub fn from_rows(rows: Vec<Vec<CellState>>) -> Self {
        let height = rows.len();
        assert!(height > 0, "board needs at least one row");
        let width = rows[0].len();
        assert!(width > 0, "board needs at least one column");
        for (y, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), width, "row {y} has {} cells, expected {width}", row.len());
        }
        Self { width, height, rows }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Panics if `row` or `col` is outside the board.
    pub fn cell(&self, row: usize, col: usize) -> CellState {
        self.rows[row][col]
    }

    pub fn rows(&self) -> &[Vec<CellState>] {
        &self.rows
    }

    pub fn is_valid_placement(&self, piece: &Tetromino, position: Position) -> bool {
        piece.blocks(position).all(|block| {
            if block.x < 0 || block.x as usize >= self.width {
                return false;
            }
            if block.y >= 0 && block.y as usize >= self.height {
                return false;
            }
            block.y < 0 || !self.rows[block.y as usize][block.x as usize].is_filled()
        })
    }

    /// Writes the piece into the grid. Cells above row 0 are dropped.
    pub fn lock_piece(&mut self, piece: &Tetromino, position: Position) {
        for block in piece.blocks(position) {
            if block.y < 0 {
                continue;
            }
            let (x, y) = (block.x as usize, block.y as usize);
            if x < self.width && y < self.height {
                self.rows[y][x] = CellState::Filled(piece.tetromino_type);
            }
        }
    }

    /// Removes full rows, keeping survivors in order, and refills from the top.
    pub fn clear_full_rows(&mut self) -> u32 {
        let before = self.rows.len();
        self.rows.retain(|row| !row.iter().all(CellState::is_filled));
        let cleared = before - self.rows.len();

        if cleared > 0 {
            let mut refilled = vec![vec![CellState::Empty; self.width]; cleared];
            refilled.append(&mut self.rows);
            self.rows = refilled;
        }

        cleared as u32
    }

    /// Panics if `row` is outside the board.
    pub fn is_row_complete(&self, row: usize) -> bool {
        self.rows[row].iter().all(CellState::is_filled)
    }

    /// Panics if `row` is outside the board.
    pub fn filled_count_in_row(&self, row: usize) -> usize {
        self.rows[row].iter().filter(|cell| cell.is_filled()).count()
    }

    pub fn total_filled_cells(&self) -> usize {
        self.rows.iter().flatten().filter(|cell| cell.is_filled()).count()
    }
}
