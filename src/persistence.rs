//! File I/O for saving and loading solutions.
//!
//! Layout under the output root:
//! - `{n}x{n}/progress.json`: the checkpoint
//! - `{n}x{n}/{category}/{index}.json`: one solution per file, as
//!   `[{"pieceIndex", "rotation", "x", "y"}, ...]`, indices sequential from 0

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{io_error, json_error, Result};
use crate::pieces::{PiecePlacement, Solution};

const CHECKPOINT_FILE: &str = "progress.json";
const SOLUTION_EXTENSION: &str = "json";

/// Directory holding everything for one grid size.
pub fn grid_dir(output: &Path, grid_size: usize) -> PathBuf {
    output.join(format!("{grid_size}x{grid_size}"))
}

pub fn checkpoint_path(output: &Path, grid_size: usize) -> PathBuf {
    grid_dir(output, grid_size).join(CHECKPOINT_FILE)
}

pub fn category_dir(output: &Path, grid_size: usize, category: &str) -> PathBuf {
    grid_dir(output, grid_size).join(category)
}

/// Index encoded in a solution file name, if it is one.
fn file_index(path: &Path) -> Option<usize> {
    if path.extension()? != SOLUTION_EXTENSION {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}

/// Solution files in `dir` sorted by index. A missing directory is empty.
pub fn solution_files(dir: &Path) -> Result<Vec<(usize, PathBuf)>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(io_error("list solutions in", dir)(err)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(io_error("list solutions in", dir))?.path();
        if let Some(index) = file_index(&path) {
            files.push((index, path));
        }
    }
    files.sort_unstable_by_key(|(index, _)| *index);
    Ok(files)
}

/// Index the next written solution gets: one past the highest existing.
pub fn next_index(dir: &Path) -> Result<usize> {
    Ok(solution_files(dir)?
        .last()
        .map_or(0, |(index, _)| index + 1))
}

/// Writes one solution as `{index}.json` in `dir`.
pub fn save_solution(dir: &Path, index: usize, solution: &[PiecePlacement]) -> Result<PathBuf> {
    let path = dir.join(format!("{index}.{SOLUTION_EXTENSION}"));
    let json = serde_json::to_string(solution).map_err(json_error(&path))?;
    fs::write(&path, json).map_err(io_error("write solution", &path))?;
    Ok(path)
}

/// Appends solutions to `dir`, continuing the existing numbering.
///
/// Returns the written paths in order.
pub fn save_all(dir: &Path, solutions: &[Solution]) -> Result<Vec<PathBuf>> {
    if solutions.is_empty() {
        return Ok(Vec::new());
    }
    fs::create_dir_all(dir).map_err(io_error("create solution directory", dir))?;

    let first = next_index(dir)?;
    solutions
        .iter()
        .enumerate()
        .map(|(offset, solution)| save_solution(dir, first + offset, solution))
        .collect()
}

pub fn load_solution(path: &Path) -> Result<Solution> {
    let contents = fs::read_to_string(path).map_err(io_error("read solution", path))?;
    serde_json::from_str(&contents).map_err(json_error(path))
}

/// Loads every solution file in `dir`, in index order.
pub fn load_all(dir: &Path) -> Result<Vec<(PathBuf, Solution)>> {
    solution_files(dir)?
        .into_iter()
        .map(|(_, path)| {
            let solution = load_solution(&path)?;
            Ok((path, solution))
        })
        .collect()
}

/// Returns the number of saved solutions without loading them.
pub fn count(dir: &Path) -> Result<usize> {
    Ok(solution_files(dir)?.len())
}
