use crate::piece::{Piece, PieceType};

pub const GRID_WIDTH: usize = 10;
pub const GRID_HEIGHT: usize = 20;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CellState {
    #[default]
    Empty,
    Filled(PieceType),
}

impl CellState {
    /// 0 for an empty cell, otherwise the piece type id used for coloring.
    pub fn id(self) -> u8 {
        match self {
            CellState::Empty => 0,
            CellState::Filled(piece_type) => piece_type.id(),
        }
    }

    pub fn is_filled(self) -> bool {
        self != CellState::Empty
    }
}

pub type Row = [CellState; GRID_WIDTH];

// ============================================================================
// Grid
// ============================================================================

/// Locked cells of the playfield. Row 0 is the top; the dimensions never change.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    rows: [Row; GRID_HEIGHT],
}

impl Grid {
    pub fn new() -> Self {
        Self {
            rows: [[CellState::Empty; GRID_WIDTH]; GRID_HEIGHT],
        }
    }

    pub fn rows(&self) -> &[Row; GRID_HEIGHT] {
        &self.rows
    }

    pub fn cell(&self, x: usize, y: usize) -> CellState {
        self.rows[y][x]
    }

    /// Cell at signed coordinates, `None` outside the grid.
    pub fn get(&self, x: i16, y: i16) -> Option<CellState> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        self.rows.get(y)?.get(x).copied()
    }

    pub fn set(&mut self, x: usize, y: usize, cell: CellState) {
        self.rows[y][x] = cell;
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows[y].iter().all(|cell| cell.is_filled())
    }

    pub fn filled_count_in_row(&self, y: usize) -> usize {
        self.rows[y].iter().filter(|cell| cell.is_filled()).count()
    }

    pub fn total_filled_cells(&self) -> usize {
        self.rows.iter().flatten().filter(|cell| cell.is_filled()).count()
    }

    /// Writes the piece's type into every cell it covers. Cells above the
    /// top row have nowhere to go and are dropped.
    pub fn place(&mut self, piece: &Piece) {
        let filled = CellState::Filled(piece.piece_type);
        for (x, y) in piece.cells() {
            if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) {
                if y < GRID_HEIGHT && x < GRID_WIDTH {
                    self.rows[y][x] = filled;
                }
            }
        }
    }

    /// Removes row `y`, shifts every row above it down by one and empties the top row.
    pub fn remove_row(&mut self, y: usize) {
        self.rows.copy_within(0..y, 1);
        self.rows[0] = [CellState::Empty; GRID_WIDTH];
    }

    /// Removes every full row, scanning bottom to top, and returns how many were removed.
    pub fn clear_full_rows(&mut self) -> u32 {
        let mut cleared = 0;
        let mut y = GRID_HEIGHT;

        while y > 0 {
            if self.is_row_full(y - 1) {
                self.remove_row(y - 1);
                cleared += 1;
                // Same index again: the row above has shifted into it
            } else {
                y -= 1;
            }
        }

        cleared
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Collision
// ============================================================================

/// Whether `piece` overlaps a wall, the floor or a locked cell.
///
/// Cells above the top row count as empty, so a piece poking out of the top
/// only collides through its horizontal bounds.
pub fn collides(piece: &Piece, grid: &Grid) -> bool {
    piece.cells().any(|(x, y)| {
        if x < 0 || x >= GRID_WIDTH as i16 || y >= GRID_HEIGHT as i16 {
            return true;
        }
        y >= 0 && grid.cell(x as usize, y as usize).is_filled()
    })
}
