//! Piece geometry: the seven canonical shapes and the clockwise rotation.
//!
//! A shape is an `N×N` occupancy grid (N is 2, 3 or 4). Rotation keeps the
//! grid size and has no notion of wall kicks.

pub const MAX_SHAPE_SIZE: usize = 4;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum TetrominoType {
    I,
    O,
    T,
    S,
    Z,
    L,
    J,
}

impl TetrominoType {
    pub const ALL: [TetrominoType; 7] = [
        TetrominoType::I,
        TetrominoType::O,
        TetrominoType::T,
        TetrominoType::S,
        TetrominoType::Z,
        TetrominoType::L,
        TetrominoType::J,
    ];

    fn rows(&self) -> &'static [&'static str] {
        match self {
            TetrominoType::I => &["....", "####", "....", "...."],
            TetrominoType::O => &["##", "##"],
            TetrominoType::T => &[".#.", "###", "..."],
            TetrominoType::S => &[".##", "##.", "..."],
            TetrominoType::Z => &["##.", ".##", "..."],
            TetrominoType::L => &["..#", "###", "..."],
            TetrominoType::J => &["#..", "###", "..."],
        }
    }
}

/// Occupancy grid of a piece in one orientation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Shape {
    size: usize,
    cells: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl Shape {
    /// Builds a shape from rows of `#` (occupied) and `.` (empty).
    ///
    /// Panics unless the rows form a square of side 1..=4.
    pub fn from_rows(rows: &[&str]) -> Self {
        let size = rows.len();
        assert!(
            (1..=MAX_SHAPE_SIZE).contains(&size),
            "shape size must be between 1 and {MAX_SHAPE_SIZE}, got {size}"
        );
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (row, line) in rows.iter().enumerate() {
            assert_eq!(line.len(), size, "shape row {row} is not {size} wide");
            for (col, ch) in line.chars().enumerate() {
                cells[row][col] = ch == '#';
            }
        }
        Self { size, cells }
    }

    /// Side length N of the bounding grid.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.cells[row][col]
    }

    /// `(row, col)` of every occupied cell, top-to-bottom then left-to-right.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.size).flat_map(move |row| {
            (0..self.size)
                .filter(move |&col| self.cells[row][col])
                .map(move |col| (row, col))
        })
    }

    pub fn rotated_clockwise(&self) -> Self {
        let n = self.size;
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (row, line) in cells.iter_mut().enumerate().take(n) {
            for (col, cell) in line.iter_mut().enumerate().take(n) {
                *cell = self.cells[n - 1 - col][row];
            }
        }
        Self { size: n, cells }
    }
}

/// Canonical spawn orientation for `kind`.
pub fn shape_of(kind: TetrominoType) -> Shape {
    Shape::from_rows(kind.rows())
}

/// `rotated[row][col] = shape[N-1-col][row]`
pub fn rotate_clockwise(shape: &Shape) -> Shape {
    shape.rotated_clockwise()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_four_cells() {
        for kind in TetrominoType::ALL {
            assert_eq!(shape_of(kind).occupied().count(), 4, "{kind:?}");
        }
    }

    #[test]
    fn shape_sizes_match_kinds() {
        assert_eq!(shape_of(TetrominoType::I).size(), 4);
        assert_eq!(shape_of(TetrominoType::O).size(), 2);
        for kind in [
            TetrominoType::T,
            TetrominoType::S,
            TetrominoType::Z,
            TetrominoType::L,
            TetrominoType::J,
        ] {
            assert_eq!(shape_of(kind).size(), 3);
        }
    }

    #[test]
    fn t_rotates_to_point_right() {
        let rotated = rotate_clockwise(&shape_of(TetrominoType::T));
        assert_eq!(rotated, Shape::from_rows(&[".#.", ".##", ".#."]));
    }

    #[test]
    fn i_rotates_to_vertical_column() {
        let rotated = rotate_clockwise(&shape_of(TetrominoType::I));
        assert_eq!(rotated, Shape::from_rows(&["..#.", "..#.", "..#.", "..#."]));
    }

    #[test]
    fn o_is_rotation_invariant() {
        let o = shape_of(TetrominoType::O);
        assert_eq!(rotate_clockwise(&o), o);
    }
}
