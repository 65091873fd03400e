//! Bitboard representation of a square grid.
//!
//! Occupancy is packed into one `u64`: bit `y * grid_size + x` is set iff
//! cell `(x, y)` is covered. Masks are plain values, so the search threads
//! them through recursion by copy and never has to undo a placement.

use crate::error::InvalidSolution;
use crate::pieces::{num_empty_tiles, PiecePlacement, BLOCKS_PER_PIECE};

/// Occupancy bitmask for one grid.
pub type GridMask = u64;

/// Largest grid side whose cells fit in a `GridMask`.
pub const MAX_GRID_SIZE: usize = 8;

/// Converts `(x, y)` to a linear cell index.
#[inline(always)]
pub const fn cell_index(x: usize, y: usize, grid_size: usize) -> usize {
    y * grid_size + x
}

/// Converts a linear cell index to `(x, y)`.
#[inline(always)]
pub const fn cell_coord(cell: usize, grid_size: usize) -> (usize, usize) {
    (cell % grid_size, cell / grid_size)
}

/// Bitmask with only cell `(x, y)` set.
#[inline(always)]
pub const fn cell_bit(x: usize, y: usize, grid_size: usize) -> GridMask {
    1 << cell_index(x, y, grid_size)
}

/// Bitmask with every cell of the grid set.
#[inline]
pub const fn full_mask(grid_size: usize) -> GridMask {
    let cells = grid_size * grid_size;
    if cells >= GridMask::BITS as usize {
        GridMask::MAX
    } else {
        (1 << cells) - 1
    }
}

/// Iterates the cell indices of the set bits in `mask`, lowest first.
pub fn mask_cells(mut mask: GridMask) -> impl Iterator<Item = usize> {
    std::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let cell = mask.trailing_zeros() as usize;
        mask &= mask - 1;
        Some(cell)
    })
}

/// Bits covered by a placement, or `None` if it is the sentinel, has an
/// unknown kind/rotation, or any block falls outside `[0, grid_size)`.
pub fn placement_mask(placement: &PiecePlacement, grid_size: usize) -> Option<GridMask> {
    let limit = grid_size as i32;
    let mut bits: GridMask = 0;
    for (x, y) in placement.cells()? {
        if !(0..limit).contains(&x) || !(0..limit).contains(&y) {
            return None;
        }
        bits |= cell_bit(x as usize, y as usize, grid_size);
    }
    Some(bits)
}

/// Whether `placement` can go onto a grid with occupancy `mask`.
///
/// `is_allowed` is consulted first so position filters reject before any bit
/// work is done.
#[inline]
pub fn can_place(
    mask: GridMask,
    placement: &PiecePlacement,
    grid_size: usize,
    is_allowed: impl FnOnce(&PiecePlacement) -> bool,
) -> bool {
    if !is_allowed(placement) {
        return false;
    }
    placement_mask(placement, grid_size).is_some_and(|bits| mask & bits == 0)
}

/// Returns `mask` with the placement's cells set.
///
/// The placement must have passed [`can_place`].
#[inline]
pub fn place(mask: GridMask, placement: &PiecePlacement, grid_size: usize) -> GridMask {
    let bits = placement_mask(placement, grid_size);
    debug_assert!(bits.is_some(), "placing an infeasible placement {placement:?}");
    mask | bits.unwrap_or(0)
}

/// Precomputed edge masks for neighbor shifts on one grid size.
#[derive(Debug, Clone, Copy)]
pub struct Board {
    pub size: usize,
    pub full: GridMask,
    first_column: GridMask,
    last_column: GridMask,
}

impl Board {
    pub fn new(size: usize) -> Self {
        assert!(
            size > 0 && size <= MAX_GRID_SIZE,
            "grid size {size} must be in 1..={MAX_GRID_SIZE}"
        );
        let mut first_column = 0;
        let mut last_column = 0;
        for y in 0..size {
            first_column |= cell_bit(0, y, size);
            last_column |= cell_bit(size - 1, y, size);
        }
        Self {
            size,
            full: full_mask(size),
            first_column,
            last_column,
        }
    }

    /// Unset bits of `occupied` that belong to the grid.
    #[inline(always)]
    pub fn empty(&self, occupied: GridMask) -> GridMask {
        !occupied & self.full
    }

    /// Cells 4-adjacent to any cell of `cells`, without wrapping across rows.
    #[inline(always)]
    pub fn neighbors(&self, cells: GridMask) -> GridMask {
        let east = (cells & !self.last_column) << 1;
        let west = (cells & !self.first_column) >> 1;
        let south = cells << self.size;
        let north = cells >> self.size;
        (east | west | south | north) & self.full
    }

    /// For each direction (east, west, south, north), the cells whose
    /// neighbor in that direction belongs to `cells`.
    #[inline(always)]
    pub fn neighbor_planes(&self, cells: GridMask) -> [GridMask; 4] {
        [
            (cells >> 1) & !self.last_column,
            (cells << 1) & !self.first_column & self.full,
            cells >> self.size,
            (cells << self.size) & self.full,
        ]
    }
}

/// Checks that a solution covers every cell exactly once.
///
/// Sentinel entries count as covering their cell, and the number of sentinels
/// must match the grid's empty-tile count.
pub fn validate_solution(
    solution: &[PiecePlacement],
    grid_size: usize,
) -> Result<(), InvalidSolution> {
    let limit = grid_size as i32;
    let mut covered = vec![0u8; grid_size * grid_size];
    let mut empty_cells = 0;

    for (position, placement) in solution.iter().enumerate() {
        let cells: Vec<(i32, i32)> = if placement.is_empty_cell() {
            empty_cells += 1;
            vec![(placement.x, placement.y)]
        } else {
            let Some(kind) = placement.kind() else {
                return Err(InvalidSolution::UnknownPiece {
                    position,
                    piece_index: placement.piece_index,
                });
            };
            let Some(shape) = kind.shapes().get(placement.rotation) else {
                return Err(InvalidSolution::UnknownRotation {
                    position,
                    rotation: placement.rotation,
                });
            };
            shape
                .iter()
                .map(|&(dx, dy)| (placement.x + dx, placement.y + dy))
                .collect()
        };

        for (x, y) in cells {
            if !(0..limit).contains(&x) || !(0..limit).contains(&y) {
                return Err(InvalidSolution::OutOfBounds { position, x, y });
            }
            let count = &mut covered[cell_index(x as usize, y as usize, grid_size)];
            if *count > 0 {
                return Err(InvalidSolution::Overlap { x, y });
            }
            *count += 1;
        }
    }

    if let Some(cell) = covered.iter().position(|&count| count == 0) {
        let (x, y) = cell_coord(cell, grid_size);
        return Err(InvalidSolution::Uncovered {
            x: x as i32,
            y: y as i32,
        });
    }

    let expected = num_empty_tiles(grid_size);
    if empty_cells != expected {
        return Err(InvalidSolution::EmptyCellCount {
            expected,
            found: empty_cells,
        });
    }

    debug_assert_eq!(
        (solution.len() - empty_cells) * BLOCKS_PER_PIECE + empty_cells,
        grid_size * grid_size
    );
    Ok(())
}

/// Formats a solution as text: one letter per cell, `.` for uncovered cells,
/// rows from top to bottom.
pub fn format_solution(solution: &[PiecePlacement], grid_size: usize) -> String {
    let mut letters = vec!['.'; grid_size * grid_size];
    let limit = grid_size as i32;

    for placement in solution {
        let (Some(kind), Some(cells)) = (placement.kind(), placement.cells()) else {
            continue;
        };
        for (x, y) in cells {
            if (0..limit).contains(&x) && (0..limit).contains(&y) {
                letters[cell_index(x as usize, y as usize, grid_size)] = kind.letter();
            }
        }
    }

    let mut output = String::with_capacity(grid_size * (grid_size + 1));
    for row in letters.chunks(grid_size) {
        output.extend(row);
        output.push('\n');
    }
    output
}
