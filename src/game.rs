use crate::board::{Board, CellState};
use crate::config::GameConfig;
use crate::piece::{Position, Tetromino};
use crate::shape::TetrominoType;
use crate::spawner::{PieceProvider, RandomPieceProvider, Spawner};

// ============================================================================
// Configuration
// ============================================================================

/// Flat bonus per cleared row, no multi-line multiplier.
pub const SCORE_PER_LINE: u32 = 100;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    /// Constructed, no piece placed yet.
    Ready,
    Running,
    /// Terminal until the next `reset`.
    GameOver,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    GameStarted,
    PieceMoved,
    PieceRotated,
    PieceFell,
    PieceLocked,
    LinesCleared(u32),
    PieceSpawned(TetrominoType),
    GameOver,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ActivePiece {
    pub piece: Tetromino,
    pub position: Position,
}

/// Read-only view handed to the rendering layer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GameSnapshot {
    /// Settled cells with the active piece drawn on top.
    pub cells: Vec<Vec<CellState>>,
    pub score: u32,
    pub lines_cleared: u32,
    pub state: GameState,
    pub game_over: bool,
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    board: Board,
    active: Option<ActivePiece>,
    score: u32,
    lines_cleared: u32,
    state: GameState,
    spawner: Spawner,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new() -> Self {
        Self::with_provider(GameConfig::default(), Box::new(RandomPieceProvider::new()))
    }

    /// A game in `Ready`; call [`Game::reset`] to start it.
    pub fn with_provider(config: GameConfig, provider: Box<dyn PieceProvider>) -> Self {
        Self {
            board: Board::new(config.width, config.height),
            active: None,
            score: 0,
            lines_cleared: 0,
            state: GameState::Ready,
            spawner: Spawner::new(provider, config.width),
            events: Vec::new(),
        }
    }

    /// A running game over a prepared board, with `piece` already in play.
    pub fn with_board(
        board: Board,
        piece: Tetromino,
        position: Position,
        provider: Box<dyn PieceProvider>,
    ) -> Self {
        let spawner = Spawner::new(provider, board.width());
        Self {
            board,
            active: Some(ActivePiece { piece, position }),
            score: 0,
            lines_cleared: 0,
            state: GameState::Running,
            spawner,
            events: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    /// Empty board, zero score, first piece in play.
    pub fn reset(&mut self) {
        self.board = Board::new(self.board.width(), self.board.height());
        self.active = None;
        self.score = 0;
        self.lines_cleared = 0;
        self.events.clear();

        self.state = GameState::Running;
        self.events.push(GameEvent::GameStarted);
        self.spawn_next_piece();
    }

    /// Shifts the piece one column. `direction` must be -1 or +1.
    pub fn move_horizontal(&mut self, direction: i16) -> bool {
        assert!(
            direction == -1 || direction == 1,
            "horizontal direction must be -1 or +1, got {direction}"
        );
        let Some(active) = self.live_piece() else {
            return false;
        };

        let candidate = active.position.offset(direction, 0);
        if !self.board.is_valid_placement(&active.piece, candidate) {
            return false;
        }
        self.active = Some(ActivePiece {
            position: candidate,
            ..active
        });
        self.events.push(GameEvent::PieceMoved);
        true
    }

    /// Clockwise rotation in place; rejected outright if it would collide.
    pub fn rotate(&mut self) -> bool {
        let Some(active) = self.live_piece() else {
            return false;
        };

        let rotated = active.piece.rotated();
        if !self.board.is_valid_placement(&rotated, active.position) {
            return false;
        }
        self.active = Some(ActivePiece {
            piece: rotated,
            ..active
        });
        self.events.push(GameEvent::PieceRotated);
        true
    }

    /// One row of gravity. Locks the piece when it cannot fall.
    pub fn tick(&mut self) {
        let Some(active) = self.live_piece() else {
            return;
        };

        if self.fall(active) {
            self.events.push(GameEvent::PieceFell);
        } else {
            self.lock_and_spawn(active);
        }
    }

    /// Falls until the piece locks.
    pub fn hard_drop(&mut self) {
        let Some(mut active) = self.live_piece() else {
            return;
        };

        while self.fall(active) {
            active.position = active.position.offset(0, 1);
        }
        self.lock_and_spawn(active);
    }

    /// The current board with the active piece overlaid.
    ///
    /// Piece cells outside the board are left out. No overlay once the game
    /// is over.
    pub fn render_grid(&self) -> Vec<Vec<CellState>> {
        let mut visual_grid = self.board.rows().to_vec();

        if self.state != GameState::Running {
            return visual_grid;
        }
        if let Some(active) = &self.active {
            let (width, height) = (self.board.width() as i16, self.board.height() as i16);
            for block in active.piece.blocks(active.position) {
                if block.x >= 0 && block.x < width && block.y >= 0 && block.y < height {
                    visual_grid[block.y as usize][block.x as usize] =
                        CellState::Filled(active.piece.tetromino_type);
                }
            }
        }

        visual_grid
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            cells: self.render_grid(),
            score: self.score,
            lines_cleared: self.lines_cleared,
            state: self.state,
            game_over: self.is_game_over(),
        }
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn live_piece(&self) -> Option<ActivePiece> {
        match self.state {
            GameState::Running => self.active,
            GameState::Ready | GameState::GameOver => None,
        }
    }

    /// Commits a one-row fall if it fits.
    fn fall(&mut self, active: ActivePiece) -> bool {
        let below = active.position.offset(0, 1);
        if !self.board.is_valid_placement(&active.piece, below) {
            return false;
        }
        self.active = Some(ActivePiece {
            position: below,
            ..active
        });
        true
    }

    fn lock_and_spawn(&mut self, active: ActivePiece) {
        self.board.lock_piece(&active.piece, active.position);
        self.events.push(GameEvent::PieceLocked);

        let lines = self.board.clear_full_rows();
        if lines > 0 {
            self.score = self.score.saturating_add(lines.saturating_mul(SCORE_PER_LINE));
            self.lines_cleared += lines;
            self.events.push(GameEvent::LinesCleared(lines));
        }

        self.spawn_next_piece();
    }

    /// Game over is decided here only, against the already-cleared board.
    fn spawn_next_piece(&mut self) {
        let (piece, position) = self.spawner.spawn();

        if self.board.is_valid_placement(&piece, position) {
            self.active = Some(ActivePiece { piece, position });
            self.events.push(GameEvent::PieceSpawned(piece.tetromino_type));
        } else {
            self.state = GameState::GameOver;
            self.events.push(GameEvent::GameOver);
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::config::{GRID_HEIGHT, GRID_WIDTH};

    pub fn empty_grid() -> Vec<Vec<CellState>> {
        vec![vec![CellState::Empty; GRID_WIDTH]; GRID_HEIGHT]
    }

    pub fn fill_row(grid: &mut [Vec<CellState>], y: usize) {
        for cell in grid[y].iter_mut() {
            *cell = CellState::Filled(TetrominoType::T);
        }
    }

    pub fn fill_row_with_gaps(grid: &mut [Vec<CellState>], y: usize, gaps: &[usize]) {
        for (x, cell) in grid[y].iter_mut().enumerate() {
            if !gaps.contains(&x) {
                *cell = CellState::Filled(TetrominoType::T);
            }
        }
    }
}
