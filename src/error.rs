//! Error types for configuration, search setup and file I/O.

use std::path::PathBuf;

use thiserror::Error;

use crate::grid::MAX_GRID_SIZE;

/// Main error type for generator operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The grid does not fit in a single 64-bit bitboard.
    #[error("grid size {grid_size} exceeds the {max}x{max} bitboard limit", max = MAX_GRID_SIZE)]
    GridTooLarge { grid_size: usize },

    /// No piece list is defined for this grid size and piece count.
    #[error("no piece list defined for {num_pieces} pieces on a {grid_size}x{grid_size} grid")]
    UnsupportedPieceCount { grid_size: usize, num_pieces: usize },

    /// Random sampling could not produce enough distinct combinations.
    #[error("found only {found} of {requested} unique piece combinations after {attempts} attempts")]
    CombinationsExhausted {
        requested: usize,
        found: usize,
        attempts: usize,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// File system operation failure.
    #[error("failed to {operation} '{}'", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed or produced.
    #[error("malformed JSON in '{}'", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A solution does not tile the grid.
    #[error(transparent)]
    InvalidSolution(#[from] InvalidSolution),
}

/// The first violation found when checking that a solution tiles its grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSolution {
    #[error("placement {position} uses unknown piece index {piece_index}")]
    UnknownPiece { position: usize, piece_index: i32 },

    #[error("placement {position} uses rotation {rotation}, which its piece does not have")]
    UnknownRotation { position: usize, rotation: usize },

    #[error("placement {position} puts a block outside the grid at ({x}, {y})")]
    OutOfBounds { position: usize, x: i32, y: i32 },

    #[error("cell ({x}, {y}) is covered more than once")]
    Overlap { x: i32, y: i32 },

    #[error("cell ({x}, {y}) is not covered")]
    Uncovered { x: i32, y: i32 },

    #[error("expected {expected} empty cells, found {found}")]
    EmptyCellCount { expected: usize, found: usize },
}

/// Convenience type alias for generator results.
pub type Result<T> = std::result::Result<T, Error>;

/// Attaches the failing operation and path to an I/O error.
pub(crate) fn io_error(
    operation: &'static str,
    path: impl Into<PathBuf>,
) -> impl FnOnce(std::io::Error) -> Error {
    let path = path.into();
    move |source| Error::Io {
        operation,
        path,
        source,
    }
}

/// Attaches the offending path to a JSON error.
pub(crate) fn json_error(path: impl Into<PathBuf>) -> impl FnOnce(serde_json::Error) -> Error {
    let path = path.into();
    move |source| Error::Json { path, source }
}
