//! Tetromino catalog, placements and supported board configurations.
//!
//! Each piece kind is defined by its rotation states, every state listing four
//! block offsets normalized so the minimum x and y are at the origin. The
//! anchor of a placement is the top-left corner of the rotation's bounding box;
//! x grows to the right and y grows downward.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::MAX_GRID_SIZE;

/// A 2D block offset `(dx, dy)`.
pub type Offset = (i32, i32);

/// Number of blocks in every piece.
pub const BLOCKS_PER_PIECE: usize = 4;

/// One rotation state of a piece: four block offsets from the anchor.
pub type PieceShape = [Offset; BLOCKS_PER_PIECE];

/// Piece index used on the wire for an uncovered cell.
pub const EMPTY_CELL_INDEX: i32 = -1;

/// The seven piece kinds, in wire-format index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

// The horizontal I is left out: a full row of one piece gives the board away.
const I_SHAPES: &[PieceShape] = &[[(0, 0), (0, 1), (0, 2), (0, 3)]];

const O_SHAPES: &[PieceShape] = &[[(0, 0), (1, 0), (0, 1), (1, 1)]];

const T_SHAPES: &[PieceShape] = &[
    // pointing up
    [(1, 0), (0, 1), (1, 1), (2, 1)],
    // pointing right
    [(0, 0), (0, 1), (1, 1), (0, 2)],
    // pointing down
    [(0, 0), (1, 0), (2, 0), (1, 1)],
    // pointing left
    [(1, 0), (0, 1), (1, 1), (1, 2)],
];

const L_SHAPES: &[PieceShape] = &[
    [(0, 0), (0, 1), (0, 2), (1, 2)],
    [(0, 0), (1, 0), (2, 0), (0, 1)],
    [(0, 0), (1, 0), (1, 1), (1, 2)],
    [(2, 0), (0, 1), (1, 1), (2, 1)],
];

const J_SHAPES: &[PieceShape] = &[
    [(1, 0), (1, 1), (0, 2), (1, 2)],
    [(0, 0), (0, 1), (1, 1), (2, 1)],
    [(0, 0), (1, 0), (0, 1), (0, 2)],
    [(0, 0), (1, 0), (2, 0), (2, 1)],
];

const S_SHAPES: &[PieceShape] = &[
    [(1, 0), (2, 0), (0, 1), (1, 1)],
    [(0, 0), (0, 1), (1, 1), (1, 2)],
];

const Z_SHAPES: &[PieceShape] = &[
    [(0, 0), (1, 0), (1, 1), (2, 1)],
    [(1, 0), (0, 1), (1, 1), (0, 2)],
];

impl PieceKind {
    /// All kinds in index order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
    ];

    /// Wire-format index of this kind.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Looks up a kind by wire-format index.
    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Single-letter name used for text rendering.
    pub const fn letter(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::L => 'L',
            PieceKind::J => 'J',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
        }
    }

    /// Rotation states of this kind, in rotation-index order.
    #[inline]
    pub const fn shapes(self) -> &'static [PieceShape] {
        match self {
            PieceKind::I => I_SHAPES,
            PieceKind::O => O_SHAPES,
            PieceKind::T => T_SHAPES,
            PieceKind::L => L_SHAPES,
            PieceKind::J => J_SHAPES,
            PieceKind::S => S_SHAPES,
            PieceKind::Z => Z_SHAPES,
        }
    }

    /// The kind this one turns into under a mirror reflection.
    pub const fn mirrored(self) -> Self {
        match self {
            PieceKind::L => PieceKind::J,
            PieceKind::J => PieceKind::L,
            PieceKind::S => PieceKind::Z,
            PieceKind::Z => PieceKind::S,
            other => other,
        }
    }
}

/// Width and height of a shape's bounding box.
pub fn shape_extent(shape: &PieceShape) -> (i32, i32) {
    let width = shape.iter().map(|&(dx, _)| dx).max().unwrap_or(0) + 1;
    let height = shape.iter().map(|&(_, dy)| dy).max().unwrap_or(0) + 1;
    (width, height)
}

/// Checks the static catalog.
///
/// Every rotation must have four distinct, edge-connected blocks normalized
/// to the origin, and must be a quarter-turn orientation of rotation 0.
pub fn validate_catalog() -> std::result::Result<(), String> {
    for kind in PieceKind::ALL {
        let shapes = kind.shapes();
        if shapes.is_empty() || shapes.len() > 4 {
            return Err(format!("{kind:?} has {} rotations", shapes.len()));
        }

        let orientations = crate::geometry::all_orientations(&shapes[0]);
        for (rotation, shape) in shapes.iter().enumerate() {
            let mut sorted = shape.to_vec();
            sorted.sort();
            sorted.dedup();
            if sorted.len() != BLOCKS_PER_PIECE {
                return Err(format!("{kind:?} rotation {rotation} repeats a block"));
            }
            if crate::geometry::normalize_to_origin(sorted.clone()) != sorted {
                return Err(format!("{kind:?} rotation {rotation} is not normalized"));
            }
            if !crate::geometry::is_connected(shape) {
                return Err(format!("{kind:?} rotation {rotation} is not connected"));
            }
            if !orientations.contains(&sorted) {
                return Err(format!(
                    "{kind:?} rotation {rotation} is not a rotation of rotation 0"
                ));
            }
            if shapes[..rotation].iter().any(|earlier| {
                let mut earlier = earlier.to_vec();
                earlier.sort();
                earlier == sorted
            }) {
                return Err(format!("{kind:?} rotation {rotation} is listed twice"));
            }
        }
    }
    Ok(())
}

/// A piece placed on the grid, or the sentinel for an uncovered cell.
///
/// Serialized as `{"pieceIndex", "rotation", "x", "y"}`; the sentinel has
/// `pieceIndex == -1` and an unused rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PiecePlacement {
    pub piece_index: i32,
    pub rotation: usize,
    pub x: i32,
    pub y: i32,
}

impl PiecePlacement {
    /// A placement of `kind` in the given rotation with its anchor at `(x, y)`.
    pub const fn new(kind: PieceKind, rotation: usize, x: i32, y: i32) -> Self {
        Self {
            piece_index: kind.index() as i32,
            rotation,
            x,
            y,
        }
    }

    /// The sentinel marking `(x, y)` as the uncovered cell.
    pub const fn empty_cell(x: i32, y: i32) -> Self {
        Self {
            piece_index: EMPTY_CELL_INDEX,
            rotation: 0,
            x,
            y,
        }
    }

    #[inline]
    pub fn is_empty_cell(&self) -> bool {
        self.piece_index == EMPTY_CELL_INDEX
    }

    /// The piece kind, or `None` for the sentinel and unknown indices.
    #[inline]
    pub fn kind(&self) -> Option<PieceKind> {
        PieceKind::from_index(self.piece_index)
    }

    /// The shape for this placement's kind and rotation, if both exist.
    #[inline]
    pub fn shape(&self) -> Option<&'static PieceShape> {
        self.kind()?.shapes().get(self.rotation)
    }

    /// Absolute cells covered by this placement.
    ///
    /// Returns `None` for the sentinel or an unknown kind/rotation. Cells may
    /// lie outside the grid; bounds are checked by the caller.
    pub fn cells(&self) -> Option<[(i32, i32); BLOCKS_PER_PIECE]> {
        let shape = self.shape()?;
        Some(shape.map(|(dx, dy)| (self.x + dx, self.y + dy)))
    }
}

/// An ordered placement list that tiles the grid.
pub type Solution = Vec<PiecePlacement>;

/// A supported board: grid size, piece count and the kinds to draw from.
#[derive(Debug, Clone, Copy)]
pub struct BoardConfiguration {
    pub grid_size: usize,
    pub num_pieces: usize,
    pub pool: &'static [PieceKind],
}

impl BoardConfiguration {
    /// Cells left uncovered once every piece is placed.
    pub const fn num_empty_tiles(&self) -> usize {
        self.grid_size * self.grid_size - self.num_pieces * BLOCKS_PER_PIECE
    }
}

/// Every board the generator knows how to fill.
pub const SUPPORTED_CONFIGURATIONS: &[BoardConfiguration] = &[
    BoardConfiguration {
        grid_size: 4,
        num_pieces: 4,
        pool: &PieceKind::ALL,
    },
    BoardConfiguration {
        grid_size: 5,
        num_pieces: 6,
        pool: &PieceKind::ALL,
    },
    BoardConfiguration {
        grid_size: 6,
        num_pieces: 9,
        pool: &PieceKind::ALL,
    },
    BoardConfiguration {
        grid_size: 7,
        num_pieces: 12,
        pool: &PieceKind::ALL,
    },
    BoardConfiguration {
        grid_size: 8,
        num_pieces: 16,
        pool: &PieceKind::ALL,
    },
];

/// Number of uncovered cells a grid of this size always has.
#[inline]
pub const fn num_empty_tiles(grid_size: usize) -> usize {
    (grid_size * grid_size) % BLOCKS_PER_PIECE
}

/// Number of pieces a grid of this size takes.
#[inline]
pub const fn default_num_pieces(grid_size: usize) -> usize {
    grid_size * grid_size / BLOCKS_PER_PIECE
}

/// Looks up the board configuration for a grid size and piece count.
pub fn board_configuration(grid_size: usize, num_pieces: usize) -> Result<BoardConfiguration> {
    if grid_size > MAX_GRID_SIZE {
        return Err(Error::GridTooLarge { grid_size });
    }
    SUPPORTED_CONFIGURATIONS
        .iter()
        .find(|config| config.grid_size == grid_size && config.num_pieces == num_pieces)
        .copied()
        .ok_or(Error::UnsupportedPieceCount {
            grid_size,
            num_pieces,
        })
}
