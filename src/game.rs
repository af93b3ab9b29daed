use crate::grid::{collides, CellState, Grid, GRID_HEIGHT, GRID_WIDTH};
use crate::piece::{Piece, PieceProvider, PieceType, RandomPieceProvider, SequencePieceProvider};

// ============================================================================
// Configuration
// ============================================================================

// Timing (in milliseconds)
pub const BASE_DROP_INTERVAL_MS: u32 = 1000;
pub const MIN_DROP_INTERVAL_MS: u32 = 200;
pub const SPEED_INCREASE_PER_LEVEL: u32 = 100;
pub const LINES_PER_LEVEL: u32 = 10;

// Scoring
pub const SCORE_SINGLE: u32 = 100;
pub const SCORE_DOUBLE: u32 = 300;
pub const SCORE_TRIPLE: u32 = 500;
pub const SCORE_TETRIS: u32 = 800;

/// Base points for clearing `lines` rows with one lock. Anything past four
/// is paid as four.
pub fn line_clear_points(lines: u32) -> u32 {
    match lines {
        0 => 0,
        1 => SCORE_SINGLE,
        2 => SCORE_DOUBLE,
        3 => SCORE_TRIPLE,
        _ => SCORE_TETRIS,
    }
}

/// Automatic drop interval for `level`, floored at `MIN_DROP_INTERVAL_MS`.
pub fn drop_interval_for_level(level: u32) -> u32 {
    let speed_reduction = level.saturating_sub(1).saturating_mul(SPEED_INCREASE_PER_LEVEL);
    BASE_DROP_INTERVAL_MS
        .saturating_sub(speed_reduction)
        .max(MIN_DROP_INTERVAL_MS)
}

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Playing,
    Paused,
    GameOver,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PieceMoved,
    PieceRotated,
    PieceLocked,
    LinesCleared(u32),
    LevelUp(u32),
    Paused,
    Unpaused,
    GameRestarted,
    GameOver,
}

/// Values shown in the score panel.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Stats {
    pub score: u32,
    pub lines: u32,
    pub level: u32,
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    pub grid: Grid,
    pub current_piece: Piece,
    pub next_piece: Piece,
    pub score: u32,
    pub lines_cleared: u32,
    pub level: u32,
    pub drop_interval_ms: u32,
    /// Time accumulated towards the next automatic drop.
    pub drop_counter_ms: u32,
    pub state: GameState,
    piece_provider: Box<dyn PieceProvider>,
    events: Vec<GameEvent>,
}

// ============================================================================
// Game Logic
// ============================================================================

impl Game {
    pub fn new() -> Self {
        Self::with_provider(Box::new(RandomPieceProvider::new()))
    }

    pub fn with_provider(mut provider: Box<dyn PieceProvider>) -> Self {
        let current_piece = Piece::spawn(provider.next_piece());
        let next_piece = Piece::spawn(provider.next_piece());
        Self::assemble(Grid::new(), current_piece, next_piece, provider)
    }

    /// Starts from a prepared grid and active piece; `provider` supplies the pieces after it.
    pub fn with_grid_and_provider(
        grid: Grid,
        current_piece: Piece,
        mut provider: Box<dyn PieceProvider>,
    ) -> Self {
        let next_piece = Piece::spawn(provider.next_piece());
        Self::assemble(grid, current_piece, next_piece, provider)
    }

    fn assemble(
        grid: Grid,
        current_piece: Piece,
        next_piece: Piece,
        piece_provider: Box<dyn PieceProvider>,
    ) -> Self {
        Self {
            grid,
            current_piece,
            next_piece,
            score: 0,
            lines_cleared: 0,
            level: 1,
            drop_interval_ms: BASE_DROP_INTERVAL_MS,
            drop_counter_ms: 0,
            state: GameState::Playing,
            piece_provider,
            events: Vec::new(),
        }
    }

    pub fn collides(&self, piece: &Piece) -> bool {
        collides(piece, &self.grid)
    }

    /// Shifts the active piece `dx` columns. A blocked move leaves it where it was.
    pub fn move_piece(&mut self, dx: i16) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        let moved = self.current_piece.moved(dx, 0);
        if self.collides(&moved) {
            return false;
        }
        self.current_piece = moved;
        self.events.push(GameEvent::PieceMoved);
        true
    }

    /// Rotates clockwise, kicking sideways by +1, -2, +3, ... from the
    /// rotated position until it fits. When the next kick would be wider
    /// than the rotated shape the rotation is abandoned and the piece is
    /// left untouched.
    pub fn rotate_piece(&mut self) -> bool {
        if self.state != GameState::Playing {
            return false;
        }

        let mut rotated = self.current_piece.rotated();
        let max_kick = rotated.shape.cols() as i16;
        let mut offset: i16 = 1;

        while self.collides(&rotated) {
            if offset.abs() > max_kick {
                return false;
            }
            rotated.x += offset;
            offset = -(offset + offset.signum());
        }

        self.current_piece = rotated;
        self.events.push(GameEvent::PieceRotated);
        true
    }

    /// Moves the piece down one row, locking it when it cannot move.
    /// Always restarts the automatic drop countdown.
    pub fn soft_drop(&mut self) {
        if self.state != GameState::Playing {
            return;
        }
        let moved = self.current_piece.moved(0, 1);
        if self.collides(&moved) {
            self.lock_piece();
        } else {
            self.current_piece = moved;
        }
        self.drop_counter_ms = 0;
    }

    pub fn hard_drop(&mut self) {
        if self.state != GameState::Playing {
            return;
        }
        loop {
            let moved = self.current_piece.moved(0, 1);
            if self.collides(&moved) {
                break;
            }
            self.current_piece = moved;
        }
        self.lock_piece();
        self.drop_counter_ms = 0;
    }

    fn lock_piece(&mut self) {
        self.grid.place(&self.current_piece);
        self.events.push(GameEvent::PieceLocked);
        self.clear_lines();
        self.spawn_next_piece();
    }

    /// Removes full rows and scores them. Returns the number of rows removed.
    pub fn clear_lines(&mut self) -> u32 {
        let cleared_count = self.grid.clear_full_rows();
        if cleared_count > 0 {
            self.events.push(GameEvent::LinesCleared(cleared_count));
            self.add_score(cleared_count);
        }
        cleared_count
    }

    /// Awards points for `lines` rows cleared at once and advances the level
    /// by at most one when the line total reaches the next threshold.
    pub fn add_score(&mut self, lines: u32) {
        self.score = self
            .score
            .saturating_add(line_clear_points(lines).saturating_mul(self.level));
        self.lines_cleared += lines;

        if self.lines_cleared >= self.level * LINES_PER_LEVEL {
            self.level += 1;
            self.drop_interval_ms = drop_interval_for_level(self.level);
            self.events.push(GameEvent::LevelUp(self.level));
        }
    }

    /// Promotes the next piece and draws a fresh one behind it.
    pub fn spawn_next_piece(&mut self) {
        let upcoming = Piece::spawn(self.piece_provider.next_piece());
        self.current_piece = std::mem::replace(&mut self.next_piece, upcoming);

        if self.collides(&self.current_piece) {
            self.state = GameState::GameOver;
            self.events.push(GameEvent::GameOver);
        }
    }

    /// Feeds elapsed time into the drop countdown, dropping once it runs past
    /// the interval. The countdown restarts from zero, not from the overshoot.
    pub fn advance(&mut self, elapsed_ms: u32) {
        if self.state != GameState::Playing {
            return;
        }
        self.drop_counter_ms = self.drop_counter_ms.saturating_add(elapsed_ms);
        if self.drop_counter_ms > self.drop_interval_ms {
            self.soft_drop();
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            GameState::Playing => {
                self.state = GameState::Paused;
                self.events.push(GameEvent::Paused);
            }
            GameState::Paused => {
                self.state = GameState::Playing;
                self.events.push(GameEvent::Unpaused);
            }
            GameState::GameOver => {
                // Cannot pause when game is over
            }
        }
    }

    pub fn restart(&mut self) {
        self.grid = Grid::new();

        self.score = 0;
        self.lines_cleared = 0;
        self.level = 1;
        self.drop_interval_ms = BASE_DROP_INTERVAL_MS;
        self.drop_counter_ms = 0;

        self.state = GameState::Playing;
        self.events.clear();

        self.current_piece = Piece::spawn(self.piece_provider.next_piece());
        self.next_piece = Piece::spawn(self.piece_provider.next_piece());

        self.events.push(GameEvent::GameRestarted);
    }

    pub fn stats(&self) -> Stats {
        Stats {
            score: self.score,
            lines: self.lines_cleared,
            level: self.level,
        }
    }

    /// Returns the visual grid state with the current piece overlaid
    pub fn render_grid(&self) -> [[CellState; GRID_WIDTH]; GRID_HEIGHT] {
        let mut visual_grid = *self.grid.rows();
        let filled = CellState::Filled(self.current_piece.piece_type);

        for (x, y) in self.current_piece.cells() {
            if (0..GRID_WIDTH as i16).contains(&x) && (0..GRID_HEIGHT as i16).contains(&y) {
                visual_grid[y as usize][x as usize] = filled;
            }
        }

        visual_grid
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    pub fn is_paused(&self) -> bool {
        self.state == GameState::Paused
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

    pub fn empty_grid() -> Grid {
        Grid::new()
    }

    pub fn fill_row(grid: &mut Grid, y: usize) {
        for x in 0..GRID_WIDTH {
            grid.set(x, y, CellState::Filled(PieceType::T));
        }
    }

    pub fn fill_row_with_gap(grid: &mut Grid, y: usize, gap_x: usize) {
        for x in 0..GRID_WIDTH {
            if x != gap_x {
                grid.set(x, y, CellState::Filled(PieceType::T));
            }
        }
    }

    /// A game on `grid` whose active piece is `current`, followed by `upcoming` in a loop.
    pub fn scripted_game(grid: Grid, current: Piece, upcoming: Vec<PieceType>) -> Game {
        Game::with_grid_and_provider(grid, current, Box::new(SequencePieceProvider::new(upcoming)))
    }
}
