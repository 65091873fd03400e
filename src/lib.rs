//! Tetromino Tiling Generator Library
//!
//! Enumerates exact tilings of square grids by multisets of 4-cell pieces,
//! leaving one uncovered cell when the cell count is not a multiple of four,
//! and stores them as puzzle data.

pub mod canonical;
pub mod combination;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod persistence;
pub mod pieces;
pub mod placement;
pub mod progress;
pub mod regions;
pub mod runner;
pub mod solver;
pub mod symmetry;

pub use config::SearchConfig;
pub use error::{Error, InvalidSolution, Result};
pub use pieces::{PieceKind, PiecePlacement, Solution};
pub use runner::{CombinationReport, RunSummary, Runner};
pub use solver::{SearchEngine, SearchLimits, SearchReport, SearchStatus};
