//! Placement enumeration and heuristic ordering.
//!
//! Every legal placement of every piece kind on an empty grid is computed
//! once per grid size, scored, and sorted so the search tries the most
//! promising placements first. Corners and edges are filled before the
//! interior, which fails fast on boards that cannot be completed.

use std::cmp::Reverse;

use crate::grid::{placement_mask, Board, GridMask};
use crate::pieces::{shape_extent, PieceKind, PiecePlacement};

/// Position class bonuses, corner > edge > near-corner > interior.
const CORNER_BONUS: i32 = 100;
const EDGE_BONUS: i32 = 50;
const NEAR_CORNER_BONUS: i32 = 30;
const INTERIOR_BONUS: i32 = 10;

/// A placement on an empty grid with its precomputed bits and score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidatePlacement {
    pub placement: PiecePlacement,
    /// Bitmask where bit `i` is set if cell `i` is covered by this placement.
    pub mask: GridMask,
    pub score: i32,
}

/// Where a placement's bounding box sits relative to the grid border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionClass {
    Corner,
    Edge,
    NearCorner,
    Interior,
}

/// Classifies a bounding box `[x, x + width) x [y, y + height)`.
pub fn position_class(x: i32, y: i32, width: i32, height: i32, grid_size: i32) -> PositionClass {
    let touches_x = x == 0 || x + width == grid_size;
    let touches_y = y == 0 || y + height == grid_size;
    let near_x = x <= 1 || x + width >= grid_size - 1;
    let near_y = y <= 1 || y + height >= grid_size - 1;

    if touches_x && touches_y {
        PositionClass::Corner
    } else if touches_x || touches_y {
        PositionClass::Edge
    } else if near_x && near_y {
        PositionClass::NearCorner
    } else {
        PositionClass::Interior
    }
}

/// Heuristic score of a placement; higher is tried first.
pub fn placement_score(
    kind: PieceKind,
    rotation: usize,
    x: i32,
    y: i32,
    grid_size: usize,
) -> i32 {
    let Some(shape) = kind.shapes().get(rotation) else {
        return i32::MIN;
    };
    let (width, height) = shape_extent(shape);
    let size = grid_size as i32;
    let class = position_class(x, y, width, height, size);

    let position_bonus = match class {
        PositionClass::Corner => CORNER_BONUS,
        PositionClass::Edge => EDGE_BONUS,
        PositionClass::NearCorner => NEAR_CORNER_BONUS,
        PositionClass::Interior => {
            // doubled coordinates keep the box center integral
            let center_x = 2 * x + width;
            let center_y = 2 * y + height;
            let distance = (center_x - size).abs() + (center_y - size).abs();
            INTERIOR_BONUS + distance / 2
        }
    };

    let kind_bonus = match (kind, class) {
        (PieceKind::O, PositionClass::Corner) => 20,
        (PieceKind::I, PositionClass::Corner | PositionClass::Edge) => 15,
        (PieceKind::I, PositionClass::NearCorner) => 10,
        (PieceKind::L | PieceKind::J, PositionClass::Corner) => 10,
        (PieceKind::L | PieceKind::J, PositionClass::Edge | PositionClass::NearCorner) => 5,
        _ => 0,
    };

    let rotation_bonus = match (kind, rotation) {
        (PieceKind::T, 0) => 5,
        (PieceKind::L | PieceKind::J, 0) => 2,
        (PieceKind::S | PieceKind::Z, 0) => 1,
        _ => 0,
    };

    // stay close to the filled structure growing from the origin
    let compactness_penalty = x + y;

    position_bonus + kind_bonus + rotation_bonus - compactness_penalty
}

/// Enumerates every placement of `kind` on an empty grid, best first.
///
/// Ties keep enumeration order: rotation, then row, then column.
pub fn all_placements_ordered(kind: PieceKind, grid_size: usize) -> Vec<CandidatePlacement> {
    let size = grid_size as i32;
    let mut candidates = Vec::new();

    for (rotation, shape) in kind.shapes().iter().enumerate() {
        let (width, height) = shape_extent(shape);
        for y in 0..=size - height {
            for x in 0..=size - width {
                let placement = PiecePlacement::new(kind, rotation, x, y);
                let Some(mask) = placement_mask(&placement, grid_size) else {
                    continue;
                };
                candidates.push(CandidatePlacement {
                    placement,
                    mask,
                    score: placement_score(kind, rotation, x, y, grid_size),
                });
            }
        }
    }

    candidates.sort_by_key(|candidate| Reverse(candidate.score));
    candidates
}

/// All ordered placements for one grid size, plus a per-cell index.
///
/// Indexed by `[piece_index]` for ordered candidates and by
/// `[piece_index][cell_index]` for the masks of placements covering a cell.
#[derive(Debug, Clone)]
pub struct PlacementTable {
    pub board: Board,
    ordered: Vec<Vec<CandidatePlacement>>,
    covering: Vec<Vec<Vec<GridMask>>>,
}

impl PlacementTable {
    /// Builds the table for one grid size.
    ///
    /// Panics if the grid does not fit in a `GridMask`.
    pub fn new(grid_size: usize) -> Self {
        let board = Board::new(grid_size);
        debug_assert_eq!(crate::pieces::validate_catalog(), Ok(()));

        let ordered: Vec<Vec<CandidatePlacement>> = PieceKind::ALL
            .iter()
            .map(|&kind| all_placements_ordered(kind, grid_size))
            .collect();

        let covering = ordered
            .iter()
            .map(|candidates| {
                (0..grid_size * grid_size)
                    .map(|cell| {
                        candidates
                            .iter()
                            .filter(|candidate| candidate.mask & (1 << cell) != 0)
                            .map(|candidate| candidate.mask)
                            .collect()
                    })
                    .collect()
            })
            .collect();

        Self {
            board,
            ordered,
            covering,
        }
    }

    #[inline]
    pub fn grid_size(&self) -> usize {
        self.board.size
    }

    /// Ordered candidates for a kind, best first.
    #[inline]
    pub fn placements(&self, kind: PieceKind) -> &[CandidatePlacement] {
        &self.ordered[kind.index()]
    }

    /// Masks of every placement of `kind` that covers `cell`.
    #[inline]
    pub fn covering(&self, kind: PieceKind, cell: usize) -> &[GridMask] {
        &self.covering[kind.index()][cell]
    }

    /// Number of placements a kind has on the empty grid.
    #[inline]
    pub fn placement_count(&self, kind: PieceKind) -> usize {
        self.ordered[kind.index()].len()
    }

    /// Whether `kind` has a placement lying entirely inside `cells`.
    pub fn fits_within(&self, kind: PieceKind, cells: GridMask) -> bool {
        self.placements(kind)
            .iter()
            .any(|candidate| candidate.mask & !cells == 0)
    }

    /// Whether some placement of one of `kinds` covers `cell` using only
    /// cells from `empty`.
    pub fn can_cover(&self, kinds: &[PieceKind], cell: usize, empty: GridMask) -> bool {
        kinds.iter().any(|&kind| {
            self.covering(kind, cell)
                .iter()
                .any(|&mask| mask & !empty == 0)
        })
    }

    /// Orders a combination for search: kinds with the most placements first,
    /// ties by kind index.
    pub fn search_order(&self, kinds: &[PieceKind]) -> Vec<PieceKind> {
        let mut order = kinds.to_vec();
        order.sort_by_key(|&kind| (Reverse(self.placement_count(kind)), kind.index()));
        order
    }
}
