//! Run configuration for the generator.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{io_error, json_error, Error, Result};
use crate::persistence;
use crate::pieces::{board_configuration, default_num_pieces, BoardConfiguration};
use crate::solver::SearchLimits;
use crate::symmetry::SymmetryBreaker;

/// Everything one generator run needs. Missing JSON fields take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub grid_size: usize,
    /// Derived from the grid size when absent.
    pub num_pieces: Option<usize>,
    /// Distinct piece combinations to sample and search.
    pub combinations: usize,
    /// Solution cap per combination.
    pub max_solutions: usize,
    /// Wall-clock budget per combination; `None` is unlimited.
    pub time_budget_ms: Option<u64>,
    pub seed: String,
    pub output: PathBuf,
    pub category: String,
    pub symmetry_breaking: bool,
    /// Random draws allowed while sampling combinations.
    pub max_attempts: usize,
    pub workers: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            grid_size: 5,
            num_pieces: None,
            combinations: 10,
            max_solutions: 20,
            time_budget_ms: Some(60_000),
            seed: "tetrofill".to_string(),
            output: PathBuf::from("solutions"),
            category: "pieces".to_string(),
            symmetry_breaking: true,
            max_attempts: 10_000,
            workers: 1,
        }
    }
}

impl SearchConfig {
    /// Loads a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(io_error("read config", path))?;
        serde_json::from_str(&contents).map_err(json_error(path))
    }

    pub fn num_pieces(&self) -> usize {
        self.num_pieces
            .unwrap_or_else(|| default_num_pieces(self.grid_size))
    }

    /// Checks every field and resolves the board configuration.
    pub fn validate(&self) -> Result<BoardConfiguration> {
        let board = board_configuration(self.grid_size, self.num_pieces())?;

        let positive = [
            ("combinations", self.combinations),
            ("max_solutions", self.max_solutions),
            ("max_attempts", self.max_attempts),
            ("workers", self.workers),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(Error::InvalidConfig {
                    field,
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        if self.category.is_empty() || self.category.contains(['/', '\\']) {
            return Err(Error::InvalidConfig {
                field: "category",
                reason: format!("'{}' is not a directory name", self.category),
            });
        }

        Ok(board)
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }

    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            max_solutions: self.max_solutions,
            time_budget: self.time_budget(),
        }
    }

    pub fn symmetry(&self) -> SymmetryBreaker {
        SymmetryBreaker::new(self.symmetry_breaking)
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        persistence::checkpoint_path(&self.output, self.grid_size)
    }

    pub fn solutions_dir(&self) -> PathBuf {
        persistence::category_dir(&self.output, self.grid_size, &self.category)
    }
}
