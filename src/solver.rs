//! Backtracking search over one piece combination.
//!
//! Key optimizations:
//! - The occupancy bitmask is threaded by value, so backtracking is free
//! - Placements are precomputed and ordered per grid size
//! - Region pruning runs cheapest tier first
//! - FxHashSet for canonical-key deduplication

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use log::debug;
use rustc_hash::FxHashSet;

use crate::canonical::canonical_key;
use crate::error::Result;
use crate::grid::{can_place, cell_coord, mask_cells, place, validate_solution, GridMask};
use crate::pieces::{board_configuration, PieceKind, PiecePlacement, Solution};
use crate::placement::PlacementTable;
use crate::regions::RegionAnalyzer;
use crate::symmetry::SymmetryBreaker;

/// The clock is also sampled every this many visited nodes.
const CLOCK_SAMPLE_INTERVAL: u64 = 4096;

/// Lifecycle of the search for one combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Idle,
    Searching,
    /// Stopped after accepting the configured number of solutions.
    SolutionCapReached,
    /// Stopped because the wall-clock budget ran out.
    TimeExpired,
    /// Every branch was explored.
    Exhausted,
}

impl SearchStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Idle | Self::Searching)
    }
}

/// When to stop searching a combination early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_solutions: usize,
    /// `None` searches until the cap is reached or the tree is exhausted.
    pub time_budget: Option<Duration>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_solutions: usize::MAX,
            time_budget: None,
        }
    }
}

/// Branches cut by each pruning tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneStats {
    pub isolation: u64,
    pub deadlock: u64,
    pub regions: u64,
    pub assignment: u64,
}

impl PruneStats {
    pub fn total(&self) -> u64 {
        self.isolation + self.deadlock + self.regions + self.assignment
    }
}

/// Outcome of searching one combination.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub status: SearchStatus,
    /// Distinct solutions in the order they were found.
    pub solutions: Vec<Solution>,
    /// Placements that passed the bit check and were explored.
    pub nodes: u64,
    /// Completed tilings rejected because their canonical key was already seen.
    pub duplicates: u64,
    pub pruned: PruneStats,
    pub elapsed: Duration,
}

/// Depth-first search engine for one grid size.
///
/// Owns no grid state between runs; each call to [`SearchEngine::search`]
/// starts from an empty board.
#[derive(Debug)]
pub struct SearchEngine<'a> {
    table: &'a PlacementTable,
    analyzer: RegionAnalyzer<'a>,
    symmetry: SymmetryBreaker,
    limits: SearchLimits,
    status: SearchStatus,
}

impl<'a> SearchEngine<'a> {
    pub fn new(table: &'a PlacementTable, symmetry: SymmetryBreaker, limits: SearchLimits) -> Self {
        Self {
            table,
            analyzer: RegionAnalyzer::new(table),
            symmetry,
            limits,
            status: SearchStatus::Idle,
        }
    }

    /// Status of the most recent search, `Idle` before the first.
    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn grid_size(&self) -> usize {
        self.table.grid_size()
    }

    /// Finds distinct tilings of the grid by exactly the pieces in
    /// `combination`.
    ///
    /// Pieces are placed in [`PlacementTable::search_order`], so the order of
    /// `combination` does not matter. Running out of time or hitting the cap
    /// is reported through the status, never as an error.
    pub fn search(&mut self, combination: &[PieceKind]) -> SearchReport {
        self.status = SearchStatus::Searching;
        let order = self.table.search_order(combination);
        let started = Instant::now();

        let mut search = Search {
            table: self.table,
            analyzer: self.analyzer,
            symmetry: self.symmetry,
            limits: self.limits,
            order: &order,
            placed: Vec::with_capacity(order.len() + 1),
            seen: FxHashSet::default(),
            solutions: Vec::new(),
            nodes: 0,
            duplicates: 0,
            pruned: PruneStats::default(),
            started,
        };

        let status = if self.limits.max_solutions == 0 {
            SearchStatus::SolutionCapReached
        } else {
            match search.descend(0, 0) {
                ControlFlow::Break(status) => status,
                ControlFlow::Continue(()) => SearchStatus::Exhausted,
            }
        };
        self.status = status;

        let report = SearchReport {
            status,
            solutions: search.solutions,
            nodes: search.nodes,
            duplicates: search.duplicates,
            pruned: search.pruned,
            elapsed: started.elapsed(),
        };
        debug!(
            "{:?}: {:?} after {} nodes, {} solutions, pruned {:?}",
            order,
            report.status,
            report.nodes,
            report.solutions.len(),
            report.pruned
        );
        report
    }
}

/// Mutable state of one running search.
struct Search<'s, 'a> {
    table: &'a PlacementTable,
    analyzer: RegionAnalyzer<'a>,
    symmetry: SymmetryBreaker,
    limits: SearchLimits,
    order: &'s [PieceKind],
    placed: Vec<PiecePlacement>,
    seen: FxHashSet<String>,
    solutions: Vec<Solution>,
    nodes: u64,
    duplicates: u64,
    pruned: PruneStats,
    started: Instant,
}

impl Search<'_, '_> {
    /// Places `order[depth]` in every feasible way on top of `occupied`.
    fn descend(&mut self, depth: usize, occupied: GridMask) -> ControlFlow<SearchStatus> {
        let order = self.order;
        let Some(&kind) = order.get(depth) else {
            return self.capture(occupied);
        };
        let remaining = &order[depth + 1..];
        let table = self.table;
        let grid_size = table.grid_size();
        let symmetry = self.symmetry;

        for candidate in table.placements(kind) {
            if depth <= 1 && self.out_of_time() {
                return ControlFlow::Break(SearchStatus::TimeExpired);
            }
            if !can_place(occupied, &candidate.placement, grid_size, |placement| {
                symmetry.is_allowed(placement, depth, grid_size)
            }) {
                continue;
            }

            self.nodes += 1;
            if self.nodes % CLOCK_SAMPLE_INTERVAL == 0 && self.out_of_time() {
                return ControlFlow::Break(SearchStatus::TimeExpired);
            }

            let next = place(occupied, &candidate.placement, grid_size);
            if !remaining.is_empty() && !self.is_feasible(next, depth + 1, remaining) {
                continue;
            }

            self.placed.push(candidate.placement);
            let flow = self.descend(depth + 1, next);
            self.placed.pop();
            flow?;
        }

        ControlFlow::Continue(())
    }

    /// Runs the pruning tiers, cheapest first.
    fn is_feasible(&mut self, occupied: GridMask, placed: usize, remaining: &[PieceKind]) -> bool {
        if placed <= self.order.len() / 2 && !self.analyzer.quick_isolation_check(occupied) {
            self.pruned.isolation += 1;
            return false;
        }
        if self.analyzer.has_deadlock_pattern(occupied, remaining) {
            self.pruned.deadlock += 1;
            return false;
        }

        let regions = self.analyzer.find_regions(occupied);
        if !self.analyzer.check_fillable_regions(&regions) {
            self.pruned.regions += 1;
            return false;
        }
        if !self.analyzer.can_remaining_pieces_fit(&regions, remaining) {
            self.pruned.assignment += 1;
            return false;
        }

        true
    }

    /// Records the current placements if they leave exactly the allowed
    /// cells uncovered and form a tiling not seen before.
    fn capture(&mut self, occupied: GridMask) -> ControlFlow<SearchStatus> {
        let board = self.analyzer.board();
        let grid_size = board.size;
        let empty = board.empty(occupied);
        if empty.count_ones() as usize != self.analyzer.allowed_empty() {
            return ControlFlow::Continue(());
        }

        let mut solution = self.placed.clone();
        solution.extend(mask_cells(empty).map(|cell| {
            let (x, y) = cell_coord(cell, grid_size);
            PiecePlacement::empty_cell(x as i32, y as i32)
        }));
        debug_assert_eq!(validate_solution(&solution, grid_size), Ok(()));

        if !self.seen.insert(canonical_key(&solution, grid_size)) {
            self.duplicates += 1;
            return ControlFlow::Continue(());
        }

        self.solutions.push(solution);
        if self.solutions.len() >= self.limits.max_solutions {
            ControlFlow::Break(SearchStatus::SolutionCapReached)
        } else {
            ControlFlow::Continue(())
        }
    }

    fn out_of_time(&self) -> bool {
        self.limits
            .time_budget
            .is_some_and(|budget| self.started.elapsed() >= budget)
    }
}

/// Searches one combination on a fresh placement table.
///
/// Fails if the grid is too large or the combination does not have the
/// piece count defined for the grid size.
pub fn solve(
    grid_size: usize,
    combination: &[PieceKind],
    symmetry: SymmetryBreaker,
    limits: SearchLimits,
) -> Result<SearchReport> {
    board_configuration(grid_size, combination.len())?;

    let table = PlacementTable::new(grid_size);
    Ok(SearchEngine::new(&table, symmetry, limits).search(combination))
}
