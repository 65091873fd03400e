//! The outer loop: sample combinations, search each one, persist results.
//!
//! Workers share one placement table and claim combinations from a queue.
//! Solution files and the checkpoint are written under a single lock after
//! each combination finishes, so file numbering stays sequential and a
//! checkpointed combination always has its files on disk.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use log::{info, warn};

use crate::combination::{sample_combinations, PieceCombination};
use crate::config::SearchConfig;
use crate::error::Result;
use crate::persistence;
use crate::placement::PlacementTable;
use crate::progress::{self, ProgressState};
use crate::solver::{SearchEngine, SearchReport, SearchStatus};

/// What happened to one combination.
#[derive(Debug, Clone)]
pub struct CombinationReport {
    pub combination: PieceCombination,
    pub status: SearchStatus,
    pub nodes: u64,
    pub elapsed: Duration,
    /// Solution files written for this combination.
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub searched: usize,
    /// Combinations already completed by an earlier run.
    pub skipped: usize,
    pub solutions_written: usize,
    /// Cumulative total across all runs for this grid size.
    pub total_solutions: u64,
}

/// Checkpoint plus counters, guarded together.
#[derive(Debug)]
struct Ledger {
    progress: ProgressState,
    searched: usize,
    solutions_written: usize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A prepared run: combinations sampled and the checkpoint loaded.
#[derive(Debug)]
pub struct Runner {
    config: SearchConfig,
    pending: Vec<PieceCombination>,
    skipped: usize,
    progress: ProgressState,
}

impl Runner {
    /// Validates the configuration, samples combinations and drops those an
    /// earlier run already completed.
    pub fn new(config: SearchConfig) -> Result<Self> {
        let board = config.validate()?;
        let combinations = sample_combinations(
            board.pool,
            board.num_pieces,
            config.combinations,
            &config.seed,
            config.max_attempts,
        )?;

        let progress = progress::load(&config.checkpoint_path());
        let (done, pending): (Vec<_>, Vec<_>) = combinations
            .into_iter()
            .partition(|combination| progress.is_completed(&combination.key()));

        info!(
            "{n}x{n}: {} combinations to search, {} already completed",
            pending.len(),
            done.len(),
            n = config.grid_size
        );

        Ok(Self {
            config,
            pending,
            skipped: done.len(),
            progress,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Combinations this run will search.
    pub fn pending(&self) -> &[PieceCombination] {
        &self.pending
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Searches every pending combination, calling `observer` after each.
    ///
    /// Stops claiming new combinations after the first I/O failure and
    /// returns that error; combinations finished before it stay
    /// checkpointed.
    pub fn run(self, observer: &(dyn Fn(&CombinationReport) + Sync)) -> Result<RunSummary> {
        let Self {
            config,
            pending,
            skipped,
            progress,
        } = self;

        let table = PlacementTable::new(config.grid_size);
        let queue = Mutex::new(pending.into_iter());
        let ledger = Mutex::new(Ledger {
            progress,
            searched: 0,
            solutions_written: 0,
        });
        let failed = AtomicBool::new(false);

        let worker = |id: usize| -> Result<()> {
            let mut engine = SearchEngine::new(&table, config.symmetry(), config.limits());
            loop {
                if failed.load(Ordering::Relaxed) {
                    return Ok(());
                }
                let Some(combination) = lock(&queue).next() else {
                    return Ok(());
                };

                info!("worker {id}: searching {combination}");
                let report = engine.search(combination.kinds());
                match commit(&config, &ledger, combination, report) {
                    Ok(report) => observer(&report),
                    Err(err) => {
                        failed.store(true, Ordering::Relaxed);
                        return Err(err);
                    }
                }
            }
        };

        let results: Vec<Result<()>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..config.workers)
                .map(|id| {
                    let worker = &worker;
                    scope.spawn(move || worker(id))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });
        results.into_iter().collect::<Result<()>>()?;

        let ledger = ledger.into_inner().unwrap_or_else(PoisonError::into_inner);
        let summary = RunSummary {
            searched: ledger.searched,
            skipped,
            solutions_written: ledger.solutions_written,
            total_solutions: ledger.progress.total_solutions,
        };
        info!(
            "{n}x{n}: searched {}, skipped {}, wrote {} solutions ({} total)",
            summary.searched,
            summary.skipped,
            summary.solutions_written,
            summary.total_solutions,
            n = config.grid_size
        );
        Ok(summary)
    }
}

/// Writes a finished combination's solutions and checkpoints it.
fn commit(
    config: &SearchConfig,
    ledger: &Mutex<Ledger>,
    combination: PieceCombination,
    report: SearchReport,
) -> Result<CombinationReport> {
    let mut ledger = lock(ledger);

    let files = persistence::save_all(&config.solutions_dir(), &report.solutions)?;
    ledger.progress.record(combination.key(), files.len() as u64);
    progress::save(&config.checkpoint_path(), &ledger.progress)?;
    ledger.searched += 1;
    ledger.solutions_written += files.len();

    match report.status {
        SearchStatus::TimeExpired if files.is_empty() => {
            warn!("{combination}: no solution within the time budget")
        }
        status => info!(
            "{combination}: {status:?}, {} solutions in {:.2?}",
            files.len(),
            report.elapsed
        ),
    }

    Ok(CombinationReport {
        combination,
        status: report.status,
        nodes: report.nodes,
        elapsed: report.elapsed,
        files,
    })
}

/// Convenience wrapper: prepare and run without an observer.
pub fn run(config: SearchConfig) -> Result<RunSummary> {
    Runner::new(config)?.run(&|_| {})
}
