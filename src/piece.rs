use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::grid::GRID_WIDTH;

/// Largest bounding box any piece shape occupies, in either orientation.
pub const MAX_SHAPE_SIZE: usize = 4;

// ============================================================================
// Piece Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum PieceType {
    T,
    I,
    O,
    L,
    J,
    S,
    Z,
}

impl PieceType {
    pub const ALL: [PieceType; 7] = [
        PieceType::T,
        PieceType::I,
        PieceType::O,
        PieceType::L,
        PieceType::J,
        PieceType::S,
        PieceType::Z,
    ];

    /// Numeric id stored in grid cells and shape matrices (1..=7).
    pub fn id(self) -> u8 {
        match self {
            PieceType::T => 1,
            PieceType::I => 2,
            PieceType::O => 3,
            PieceType::L => 4,
            PieceType::J => 5,
            PieceType::S => 6,
            PieceType::Z => 7,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1..=7 => Some(Self::ALL[usize::from(id - 1)]),
            _ => None,
        }
    }

    /// Color of the piece as an RGB triple.
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            PieceType::T => (0xFF, 0x0D, 0x72),
            PieceType::I => (0x0D, 0xC2, 0xFF),
            PieceType::O => (0x0D, 0xFF, 0x72),
            PieceType::L => (0xF5, 0x38, 0xFF),
            PieceType::J => (0xFF, 0x8E, 0x0D),
            PieceType::S => (0xFF, 0xE1, 0x38),
            PieceType::Z => (0x38, 0x77, 0xFF),
        }
    }

    /// Spawn orientation of this piece type.
    pub fn shape(self) -> Shape {
        let id = self.id();
        let rows: &[&[u8]] = match self {
            PieceType::T => &[&[1, 1, 1], &[0, 1, 0]],
            PieceType::I => &[&[1, 1, 1, 1]],
            PieceType::O => &[&[1, 1], &[1, 1]],
            PieceType::L => &[&[1, 0, 0], &[1, 1, 1]],
            PieceType::J => &[&[0, 0, 1], &[1, 1, 1]],
            PieceType::S => &[&[0, 1, 1], &[1, 1, 0]],
            PieceType::Z => &[&[1, 1, 0], &[0, 1, 1]],
        };
        Shape::from_rows(rows, id)
    }
}

// ============================================================================
// Shape Matrix
// ============================================================================

/// A small matrix of cell markers: 0 is empty, any other value is the
/// owning piece's type id.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Shape {
    cells: [[u8; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
    rows: usize,
    cols: usize,
}

impl Shape {
    /// Builds a shape from a row-major mask, writing `marker` into every set cell.
    ///
    /// Panics if the mask is larger than `MAX_SHAPE_SIZE` in either dimension
    /// or its rows are ragged.
    pub fn from_rows(mask: &[&[u8]], marker: u8) -> Self {
        let rows = mask.len();
        let cols = mask.first().map_or(0, |row| row.len());
        assert!(rows <= MAX_SHAPE_SIZE && cols <= MAX_SHAPE_SIZE, "shape too large");

        let mut cells = [[0; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (r, row) in mask.iter().enumerate() {
            assert_eq!(row.len(), cols, "ragged shape row");
            for (c, &value) in row.iter().enumerate() {
                if value != 0 {
                    cells[r][c] = marker;
                }
            }
        }
        Self { cells, rows, cols }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Marker at (`row`, `col`), 0 outside the matrix.
    pub fn get(&self, row: usize, col: usize) -> u8 {
        if row < self.rows && col < self.cols {
            self.cells[row][col]
        } else {
            0
        }
    }

    /// Offsets `(dx, dy)` of every filled cell relative to the top-left corner.
    pub fn filled(&self) -> impl Iterator<Item = (i16, i16)> + '_ {
        (0..self.rows).flat_map(move |r| {
            (0..self.cols)
                .filter(move |&c| self.cells[r][c] != 0)
                .map(move |c| (c as i16, r as i16))
        })
    }

    /// Quarter turn clockwise: the transpose with each new row reversed.
    /// Row and column counts swap.
    pub fn rotated(&self) -> Self {
        let mut cells = [[0; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (r, row) in cells.iter_mut().enumerate().take(self.cols) {
            for (c, cell) in row.iter_mut().enumerate().take(self.rows) {
                *cell = self.cells[self.rows - 1 - c][r];
            }
        }
        Self {
            cells,
            rows: self.cols,
            cols: self.rows,
        }
    }
}

// ============================================================================
// Piece
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Piece {
    pub piece_type: PieceType,
    pub shape: Shape,
    pub x: i16,
    pub y: i16,
}

impl Piece {
    /// A piece in spawn orientation, horizontally centered on the top row.
    pub fn spawn(piece_type: PieceType) -> Self {
        let shape = piece_type.shape();
        let x = (GRID_WIDTH / 2) as i16 - (shape.cols() / 2) as i16;
        Self {
            piece_type,
            shape,
            x,
            y: 0,
        }
    }

    pub fn new_at(piece_type: PieceType, x: i16, y: i16) -> Self {
        Self {
            piece_type,
            shape: piece_type.shape(),
            x,
            y,
        }
    }

    pub fn color_id(&self) -> u8 {
        self.piece_type.id()
    }

    /// Absolute grid coordinates of every filled cell.
    pub fn cells(&self) -> impl Iterator<Item = (i16, i16)> + '_ {
        self.shape
            .filled()
            .map(move |(dx, dy)| (self.x + dx, self.y + dy))
    }

    pub fn moved(&self, dx: i16, dy: i16) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Same position, shape turned a quarter clockwise.
    pub fn rotated(&self) -> Self {
        Self {
            shape: self.shape.rotated(),
            ..*self
        }
    }
}

// ============================================================================
// Piece Provider Trait
// ============================================================================

pub trait PieceProvider {
    fn next_piece(&mut self) -> PieceType;
}

/// Uniform choice over the seven piece types.
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
    fn next_piece(&mut self) -> PieceType {
        PieceType::ALL[self.rng.gen_range(0..PieceType::ALL.len())]
    }
}

pub struct SequencePieceProvider {
    pieces: Vec<PieceType>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(pieces: Vec<PieceType>) -> Self {
        assert!(!pieces.is_empty(), "piece sequence must not be empty");
        Self { pieces, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> PieceType {
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }
}
