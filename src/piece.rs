use crate::shape::{rotate_clockwise, shape_of, Shape, TetrominoType};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

impl Position {
    pub fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i16, dy: i16) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// A piece value: its kind plus the shape in its current orientation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Tetromino {
    pub tetromino_type: TetrominoType,
    pub shape: Shape,
}

impl Tetromino {
    pub fn new(tetromino_type: TetrominoType) -> Self {
        Self {
            tetromino_type,
            shape: shape_of(tetromino_type),
        }
    }

    pub fn rotated(&self) -> Self {
        Self {
            tetromino_type: self.tetromino_type,
            shape: rotate_clockwise(&self.shape),
        }
    }

    /// Absolute board coordinates of every occupied cell at `position`.
    pub fn blocks(&self, position: Position) -> impl Iterator<Item = Position> + '_ {
        self.shape
            .occupied()
            .map(move |(row, col)| position.offset(col as i16, row as i16))
    }
}
