//! Offline report of solution files that encode the same tiling.

use std::path::{Path, PathBuf};

use log::info;
use rustc_hash::FxHashMap;

use crate::canonical::{canonical_key, symmetric_key};
use crate::error::Result;
use crate::persistence;
use crate::pieces::PiecePlacement;

/// Which identity two files must share to count as duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMode {
    /// Same piece kind on every cell.
    #[default]
    Exact,
    /// Same tiling up to rotation and reflection of the board.
    Symmetric,
}

impl KeyMode {
    pub fn key(self, solution: &[PiecePlacement], grid_size: usize) -> String {
        match self {
            Self::Exact => canonical_key(solution, grid_size),
            Self::Symmetric => symmetric_key(solution, grid_size),
        }
    }
}

/// Files sharing one key, in the order they were read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub key: String,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport {
    pub files_checked: usize,
    /// Only keys shared by two or more files.
    pub groups: Vec<DuplicateGroup>,
}

impl DuplicateReport {
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Files that could be removed while keeping one of each group.
    pub fn redundant_files(&self) -> usize {
        self.groups.iter().map(|group| group.files.len() - 1).sum()
    }
}

/// Groups solutions by key, keeping groups in first-seen order.
pub fn group_duplicates<I, S>(solutions: I, grid_size: usize, mode: KeyMode) -> DuplicateReport
where
    I: IntoIterator<Item = (PathBuf, S)>,
    S: AsRef<[PiecePlacement]>,
{
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    let mut by_key: FxHashMap<String, usize> = FxHashMap::default();
    let mut files_checked = 0;

    for (path, solution) in solutions {
        files_checked += 1;
        let key = mode.key(solution.as_ref(), grid_size);
        match by_key.get(&key) {
            Some(&group) => groups[group].files.push(path),
            None => {
                by_key.insert(key.clone(), groups.len());
                groups.push(DuplicateGroup {
                    key,
                    files: vec![path],
                });
            }
        }
    }

    groups.retain(|group| group.files.len() > 1);
    DuplicateReport {
        files_checked,
        groups,
    }
}

/// Reads every solution file in `dir` and reports shared keys.
///
/// Never modifies a file.
pub fn find_duplicates(dir: &Path, grid_size: usize, mode: KeyMode) -> Result<DuplicateReport> {
    let solutions = persistence::load_all(dir)?;
    let report = group_duplicates(solutions, grid_size, mode);
    info!(
        "checked {} files in {}: {} duplicate groups",
        report.files_checked,
        dir.display(),
        report.groups.len()
    );
    Ok(report)
}
