//! Resumable checkpoint of completed combinations for one grid size.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{io_error, json_error, Result};

/// Current UTC time as ISO-8601 with millisecond precision.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Checkpoint contents: `{ completedCombos, totalSolutions, lastRun }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    pub completed_combos: BTreeSet<String>,
    pub total_solutions: u64,
    pub last_run: String,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            completed_combos: BTreeSet::new(),
            total_solutions: 0,
            last_run: timestamp(),
        }
    }
}

impl ProgressState {
    #[inline]
    pub fn is_completed(&self, key: &str) -> bool {
        self.completed_combos.contains(key)
    }

    /// Marks a combination finished and adds its solutions to the total.
    pub fn record(&mut self, key: String, solutions: u64) {
        self.completed_combos.insert(key);
        self.total_solutions += solutions;
        self.last_run = timestamp();
    }
}

/// Loads a checkpoint, starting fresh if it is missing or unreadable.
pub fn load(path: &Path) -> ProgressState {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!("no checkpoint at {} ({err}), starting fresh", path.display());
            return ProgressState::default();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(state) => state,
        Err(err) => {
            warn!("corrupt checkpoint at {} ({err}), starting fresh", path.display());
            ProgressState::default()
        }
    }
}

/// Writes the full checkpoint, creating its directory if needed.
pub fn save(path: &Path, state: &ProgressState) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error("create checkpoint directory", parent))?;
    }
    let json = serde_json::to_string_pretty(state).map_err(json_error(path))?;
    fs::write(path, json).map_err(io_error("write checkpoint", path))
}
