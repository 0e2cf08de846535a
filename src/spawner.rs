use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::piece::{Position, Tetromino};
use crate::shape::TetrominoType;

// ============================================================================
// Piece Provider Trait
// ============================================================================

pub trait PieceProvider {
    fn next_piece(&mut self) -> TetrominoType;
}

/// Uniform, independent draws. No bag.
pub struct RandomPieceProvider {
    rng: StdRng,
}

impl RandomPieceProvider {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPieceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceProvider for RandomPieceProvider {
    fn next_piece(&mut self) -> TetrominoType {
        TetrominoType::ALL[self.rng.gen_range(0..TetrominoType::ALL.len())]
    }
}

pub struct SequencePieceProvider {
    pieces: Vec<TetrominoType>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(pieces: Vec<TetrominoType>) -> Self {
        assert!(!pieces.is_empty(), "sequence provider needs at least one piece");
        Self { pieces, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> TetrominoType {
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }
}

// ============================================================================
// Spawner
// ============================================================================

pub struct Spawner {
    provider: Box<dyn PieceProvider>,
    board_width: usize,
}

impl Spawner {
    pub fn new(provider: Box<dyn PieceProvider>, board_width: usize) -> Self {
        Self {
            provider,
            board_width,
        }
    }

    /// Next piece in canonical orientation at its start position.
    pub fn spawn(&mut self) -> (Tetromino, Position) {
        let piece = Tetromino::new(self.provider.next_piece());
        let position = spawn_position(&piece, self.board_width);
        (piece, position)
    }
}

/// Horizontally centred on the bounding grid, top row at 0.
pub fn spawn_position(piece: &Tetromino, board_width: usize) -> Position {
    let x = (board_width / 2) as i16 - (piece.shape.size() / 2) as i16;
    Position::new(x, 0)
}
