//! Connectivity analysis of the empty cells of a partially filled grid.
//!
//! Checks run cheapest first and only ever reject positions that provably
//! cannot be completed: every piece is edge-connected, so it lies inside a
//! single empty region, and each region must end up exactly covered apart
//! from the grid's allowed uncovered cell. A check that passes proves
//! nothing; the exhaustive search has the final word.

use crate::grid::{cell_coord, mask_cells, Board, GridMask};
use crate::pieces::{num_empty_tiles, shape_extent, PieceKind, BLOCKS_PER_PIECE};
use crate::placement::PlacementTable;

/// A maximal 4-connected set of empty cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyRegion {
    pub mask: GridMask,
    pub size: usize,
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl EmptyRegion {
    fn from_mask(mask: GridMask, grid_size: usize) -> Self {
        let mut region = Self {
            mask,
            size: mask.count_ones() as usize,
            min_x: usize::MAX,
            min_y: usize::MAX,
            max_x: 0,
            max_y: 0,
        };
        for cell in mask_cells(mask) {
            let (x, y) = cell_coord(cell, grid_size);
            region.min_x = region.min_x.min(x);
            region.min_y = region.min_y.min(y);
            region.max_x = region.max_x.max(x);
            region.max_y = region.max_y.max(y);
        }
        region
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.max_x + 1 - self.min_x
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.max_y + 1 - self.min_y
    }

    /// Number of pieces this region must hold once the grid is complete.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.size / BLOCKS_PER_PIECE
    }

    /// Whether some rotation of `kind` fits the region's bounding box.
    pub fn bounds_fit(&self, kind: PieceKind) -> bool {
        kind.shapes().iter().any(|shape| {
            let (width, height) = shape_extent(shape);
            width as usize <= self.width() && height as usize <= self.height()
        })
    }
}

/// Partitions the empty cells of `occupied` into connected regions.
///
/// Regions are discovered from the lowest empty cell upward and grown with
/// bitwise flood fill.
pub fn find_regions(board: &Board, occupied: GridMask) -> Vec<EmptyRegion> {
    let mut unvisited = board.empty(occupied);
    let mut regions = Vec::new();

    while unvisited != 0 {
        let mut region = unvisited & unvisited.wrapping_neg();
        loop {
            let grown = (region | board.neighbors(region)) & unvisited;
            if grown == region {
                break;
            }
            region = grown;
        }
        unvisited &= !region;
        regions.push(EmptyRegion::from_mask(region, board.size));
    }

    regions
}

/// Empty cells with no empty 4-neighbor.
#[inline]
pub fn isolated_cells(board: &Board, occupied: GridMask) -> GridMask {
    let empty = board.empty(occupied);
    empty & !board.neighbors(empty)
}

/// Empty cells with exactly one empty 4-neighbor.
pub fn dead_end_cells(board: &Board, occupied: GridMask) -> GridMask {
    let empty = board.empty(occupied);
    let [east, west, south, north] = board.neighbor_planes(empty);
    let at_least_one = east | west | south | north;
    let at_least_two = (east & (west | south | north)) | (west & (south | north)) | (south & north);
    empty & at_least_one & !at_least_two
}

/// Whether region sizes allow an exact tiling.
///
/// Rejects any region of size 2 or 3, any region whose size is not a
/// multiple of 4, except that one region of size 1 (mod 4) may hold the
/// uncovered cell when `has_empty_tile` is set.
pub fn regions_fillable(regions: &[EmptyRegion], has_empty_tile: bool) -> bool {
    let mut remainder_regions = 0;
    for region in regions {
        if region.size == 2 || region.size == 3 {
            return false;
        }
        match region.size % BLOCKS_PER_PIECE {
            0 => {}
            1 if has_empty_tile => {
                remainder_regions += 1;
                if remainder_regions > 1 {
                    return false;
                }
            }
            _ => return false,
        }
    }
    true
}

/// Tiered feasibility checks for one grid size.
#[derive(Debug, Clone, Copy)]
pub struct RegionAnalyzer<'a> {
    table: &'a PlacementTable,
    board: Board,
    allowed_empty: usize,
}

impl<'a> RegionAnalyzer<'a> {
    pub fn new(table: &'a PlacementTable) -> Self {
        let board = table.board;
        Self {
            table,
            board,
            allowed_empty: num_empty_tiles(board.size),
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Cells the finished grid leaves uncovered (0 or 1).
    #[inline]
    pub fn allowed_empty(&self) -> usize {
        self.allowed_empty
    }

    /// Cheapest tier: no more sealed-off single cells than may stay empty.
    #[inline]
    pub fn quick_isolation_check(&self, occupied: GridMask) -> bool {
        isolated_cells(&self.board, occupied).count_ones() as usize <= self.allowed_empty
    }

    pub fn find_regions(&self, occupied: GridMask) -> Vec<EmptyRegion> {
        find_regions(&self.board, occupied)
    }

    /// Full region validation for this grid's empty-tile allowance.
    #[inline]
    pub fn check_fillable_regions(&self, regions: &[EmptyRegion]) -> bool {
        regions_fillable(regions, self.allowed_empty > 0)
    }

    /// Local patterns that can never be completed.
    ///
    /// - the empty space differs from what the remaining pieces plus the
    ///   allowed uncovered cells need;
    /// - more sealed cells than may stay empty;
    /// - dead-end cells (one empty neighbor, typically in corners) that no
    ///   remaining piece can cover, beyond the allowed uncovered cells.
    pub fn has_deadlock_pattern(&self, occupied: GridMask, remaining: &[PieceKind]) -> bool {
        let empty = self.board.empty(occupied);
        let required_space = remaining.len() * BLOCKS_PER_PIECE + self.allowed_empty;
        if empty.count_ones() as usize != required_space {
            return true;
        }

        let mut uncoverable = isolated_cells(&self.board, occupied).count_ones() as usize;
        if uncoverable > self.allowed_empty {
            return true;
        }

        for cell in mask_cells(dead_end_cells(&self.board, occupied)) {
            if !self.table.can_cover(remaining, cell, empty) {
                uncoverable += 1;
                if uncoverable > self.allowed_empty {
                    return true;
                }
            }
        }

        false
    }

    /// Whether the remaining pieces can be shared out among the regions.
    ///
    /// Each region must receive exactly as many pieces as its capacity, and a
    /// piece may only go to a region that has a placement for it. Pieces are
    /// assigned scarcest first into the smallest regions first, backtracking
    /// over the assignment when a piece has no region left.
    pub fn can_remaining_pieces_fit(&self, regions: &[EmptyRegion], remaining: &[PieceKind]) -> bool {
        let mut regions: Vec<&EmptyRegion> = regions
            .iter()
            .filter(|region| region.capacity() > 0)
            .collect();
        regions.sort_by_key(|region| region.size);

        let capacity: usize = regions.iter().map(|region| region.capacity()).sum();
        if capacity != remaining.len() {
            return false;
        }

        let mut pieces = remaining.to_vec();
        pieces.sort_by_key(|&kind| (self.table.placement_count(kind), kind.index()));

        let fits: Vec<Vec<bool>> = pieces
            .iter()
            .map(|&kind| {
                regions
                    .iter()
                    .map(|region| region.bounds_fit(kind) && self.table.fits_within(kind, region.mask))
                    .collect()
            })
            .collect();

        let mut capacities: Vec<usize> = regions.iter().map(|region| region.capacity()).collect();
        assign_pieces(&pieces, &fits, &mut capacities, 0, 0)
    }
}

/// Backtracking assignment of `pieces[index..]` to regions with spare capacity.
///
/// Identical consecutive kinds take regions in nondecreasing order, so the
/// same split is never explored twice.
fn assign_pieces(
    pieces: &[PieceKind],
    fits: &[Vec<bool>],
    capacities: &mut [usize],
    index: usize,
    first_region: usize,
) -> bool {
    if index == pieces.len() {
        return true;
    }

    for region in first_region..capacities.len() {
        if capacities[region] == 0 || !fits[index][region] {
            continue;
        }

        capacities[region] -= 1;
        let next_first = match pieces.get(index + 1) {
            Some(&next) if next == pieces[index] => region,
            _ => 0,
        };
        let assigned = assign_pieces(pieces, fits, capacities, index + 1, next_first);
        capacities[region] += 1;

        if assigned {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{cell_bit, full_mask};

    fn column(x: usize, grid_size: usize) -> GridMask {
        (0..grid_size).fold(0, |mask, y| mask | cell_bit(x, y, grid_size))
    }

    /// Exact tiling of `empty` using exactly the kinds in `remaining`.
    fn tileable(table: &PlacementTable, empty: GridMask, remaining: &[PieceKind]) -> bool {
        if empty == 0 {
            return remaining.is_empty();
        }
        let cell = empty.trailing_zeros() as usize;
        for (position, &kind) in remaining.iter().enumerate() {
            if remaining[..position].contains(&kind) {
                continue;
            }
            let mut rest = remaining.to_vec();
            rest.remove(position);
            for &mask in table.covering(kind, cell) {
                if mask & !empty == 0 && tileable(table, empty & !mask, &rest) {
                    return true;
                }
            }
        }
        false
    }

    #[test]
    fn test_find_regions_split_by_wall() {
        let board = Board::new(4);
        let regions = find_regions(&board, column(1, 4));
        assert_eq!(regions.len(), 2);

        assert_eq!(regions[0].mask, column(0, 4));
        assert_eq!(regions[0].size, 4);
        assert_eq!((regions[0].width(), regions[0].height()), (1, 4));

        assert_eq!(regions[1].size, 8);
        assert_eq!((regions[1].min_x, regions[1].max_x), (2, 3));
        assert_eq!(regions[1].mask.trailing_zeros(), 2);
    }

    #[test]
    fn test_find_regions_does_not_wrap_rows() {
        let board = Board::new(4);
        // fill columns 1 and 2: column 3 must not join column 0 across rows
        let regions = find_regions(&board, column(1, 4) | column(2, 4));
        assert_eq!(regions.len(), 2);
        assert!(regions.iter().all(|region| region.size == 4));
    }

    #[test]
    fn test_full_grid_has_no_regions() {
        let board = Board::new(5);
        assert!(find_regions(&board, full_mask(5)).is_empty());
    }

    #[test]
    fn test_empty_grid_is_fillable() {
        for size in 4..=8 {
            let regions = find_regions(&Board::new(size), 0);
            assert_eq!(regions.len(), 1);
            assert!(regions_fillable(&regions, size % 2 == 1));
        }
    }

    #[test]
    fn test_small_regions_always_rejected() {
        let board = Board::new(4);
        for occupied in 0..=full_mask(4) {
            let regions = find_regions(&board, occupied);
            if regions.iter().any(|region| region.size == 2 || region.size == 3) {
                assert!(!regions_fillable(&regions, false), "{occupied:#06x}");
                assert!(!regions_fillable(&regions, true), "{occupied:#06x}");
            }
        }
    }

    #[test]
    fn test_single_remainder_region() {
        let board = Board::new(5);
        // wall off the top-left cell: regions of 1 and 22 cells
        let occupied = cell_bit(1, 0, 5) | cell_bit(0, 1, 5);
        let regions = find_regions(&board, occupied);
        let sizes: Vec<usize> = regions.iter().map(|region| region.size).collect();
        assert_eq!(sizes, vec![1, 22]);
        assert!(!regions_fillable(&regions, true));

        // two separate remainders are never allowed
        let single = EmptyRegion::from_mask(cell_bit(0, 0, 5), 5);
        let five = EmptyRegion::from_mask(column(4, 5), 5);
        let nine = EmptyRegion::from_mask(column(2, 5) | (column(3, 5) & !cell_bit(3, 4, 5)), 5);
        assert_eq!(nine.size, 9);
        assert!(!regions_fillable(&[single, five], true));
        assert!(!regions_fillable(&[single, nine], true));
        assert!(regions_fillable(&[five], true));
        assert!(!regions_fillable(&[five], false));
    }

    #[test]
    fn test_isolated_and_dead_end_cells() {
        let board = Board::new(4);
        let occupied = cell_bit(1, 0, 4) | cell_bit(0, 1, 4) | cell_bit(2, 1, 4);
        assert_eq!(isolated_cells(&board, occupied), cell_bit(0, 0, 4));
        // (1, 1) only opens downward
        assert_ne!(dead_end_cells(&board, occupied) & cell_bit(1, 1, 4), 0);
        assert_eq!(dead_end_cells(&board, occupied) & cell_bit(0, 0, 4), 0);
    }

    #[test]
    fn test_quick_isolation_uses_allowance() {
        let table4 = PlacementTable::new(4);
        let analyzer = RegionAnalyzer::new(&table4);
        let corner_sealed = cell_bit(1, 0, 4) | cell_bit(0, 1, 4);
        assert!(!analyzer.quick_isolation_check(corner_sealed));

        let table5 = PlacementTable::new(5);
        let analyzer = RegionAnalyzer::new(&table5);
        let corner_sealed = cell_bit(1, 0, 5) | cell_bit(0, 1, 5);
        assert!(analyzer.quick_isolation_check(corner_sealed));
        let both_sealed = corner_sealed | cell_bit(3, 4, 5) | cell_bit(4, 3, 5);
        assert!(!analyzer.quick_isolation_check(both_sealed));
    }

    #[test]
    fn test_pieces_need_a_region_that_holds_them() {
        let table = PlacementTable::new(4);
        let analyzer = RegionAnalyzer::new(&table);
        // empty: column 0 and column 3, both 1 wide
        let occupied = column(1, 4) | column(2, 4);
        let regions = analyzer.find_regions(occupied);

        assert!(analyzer.can_remaining_pieces_fit(&regions, &[PieceKind::I, PieceKind::I]));
        assert!(!analyzer.can_remaining_pieces_fit(&regions, &[PieceKind::I, PieceKind::O]));
        assert!(!analyzer.can_remaining_pieces_fit(&regions, &[PieceKind::I]));
    }

    #[test]
    fn test_assignment_backtracks() {
        let pieces = [PieceKind::T, PieceKind::L];
        // the T fits both regions but the L only the first
        let fits = vec![vec![true, true], vec![true, false]];
        let mut capacities = vec![1, 1];
        assert!(assign_pieces(&pieces, &fits, &mut capacities, 0, 0));
        assert_eq!(capacities, vec![1, 1]);

        let fits = vec![vec![false, true], vec![false, true]];
        assert!(!assign_pieces(&pieces, &fits, &mut capacities, 0, 0));
    }

    #[test]
    fn test_assignment_respects_region_shapes() {
        let table = PlacementTable::new(4);
        let analyzer = RegionAnalyzer::new(&table);
        // a 1x4 column and a 2x4 block; the O only fits the block
        let occupied = column(1, 4);
        let regions = analyzer.find_regions(occupied);
        assert!(analyzer.can_remaining_pieces_fit(
            &regions,
            &[PieceKind::O, PieceKind::I, PieceKind::O]
        ));
        assert!(!analyzer.can_remaining_pieces_fit(
            &regions,
            &[PieceKind::O, PieceKind::T, PieceKind::O]
        ));
    }

    #[test]
    fn test_deadlock_space_accounting() {
        let table = PlacementTable::new(4);
        let analyzer = RegionAnalyzer::new(&table);
        assert!(!analyzer.has_deadlock_pattern(0, &[PieceKind::O; 4]));
        assert!(analyzer.has_deadlock_pattern(0, &[PieceKind::O; 3]));
    }

    #[test]
    fn test_deadlock_uncoverable_dead_end() {
        let table = PlacementTable::new(4);
        let analyzer = RegionAnalyzer::new(&table);
        // top row filled except (0, 0), whose only exit is downward
        let occupied = cell_bit(1, 0, 4) | cell_bit(2, 0, 4) | cell_bit(3, 0, 4) | cell_bit(1, 1, 4);
        let remaining = [PieceKind::O, PieceKind::O, PieceKind::O];
        // 12 empty cells but no O reaches (0, 0)
        assert_eq!(analyzer.board().empty(occupied).count_ones(), 12);
        assert!(analyzer.has_deadlock_pattern(occupied, &remaining));
        assert!(!analyzer.has_deadlock_pattern(
            occupied,
            &[PieceKind::L, PieceKind::O, PieceKind::O]
        ));
    }

    #[test]
    fn test_checks_never_reject_a_tileable_position() {
        let table = PlacementTable::new(4);
        let analyzer = RegionAnalyzer::new(&table);
        let multisets: [[PieceKind; 2]; 5] = [
            [PieceKind::L, PieceKind::J],
            [PieceKind::T, PieceKind::T],
            [PieceKind::O, PieceKind::I],
            [PieceKind::S, PieceKind::Z],
            [PieceKind::T, PieceKind::L],
        ];

        for occupied in 0..=full_mask(4) {
            if occupied.count_ones() != 8 {
                continue;
            }
            let empty = analyzer.board().empty(occupied);
            for remaining in &multisets {
                if !tileable(&table, empty, remaining) {
                    continue;
                }
                let regions = analyzer.find_regions(occupied);
                assert!(analyzer.quick_isolation_check(occupied), "{occupied:#06x}");
                assert!(!analyzer.has_deadlock_pattern(occupied, remaining), "{occupied:#06x}");
                assert!(analyzer.check_fillable_regions(&regions), "{occupied:#06x}");
                assert!(
                    analyzer.can_remaining_pieces_fit(&regions, remaining),
                    "{occupied:#06x} {remaining:?}"
                );
            }
        }
    }
}
