//! Position filters that cut symmetric duplicate branches.

use crate::pieces::{PieceKind, PiecePlacement};

/// Filters placements by search depth to break board symmetry.
///
/// Rules, in order:
/// 1. the straight piece never sits in column 0;
/// 2. the first piece of a combination is anchored in the upper-left quadrant;
/// 3. the second piece is not anchored in the lower-right quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymmetryBreaker {
    enabled: bool,
}

impl Default for SymmetryBreaker {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SymmetryBreaker {
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// A breaker that allows every placement.
    pub const fn disabled() -> Self {
        Self::new(false)
    }

    #[inline]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether `placement` may be tried at `depth` on a `grid_size` board.
    #[inline]
    pub fn is_allowed(&self, placement: &PiecePlacement, depth: usize, grid_size: usize) -> bool {
        if !self.enabled {
            return true;
        }

        if placement.kind() == Some(PieceKind::I) && placement.x == 0 {
            return false;
        }

        // quadrants split at n/2 exactly, so odd grids keep the middle row and column
        let n = grid_size as i32;
        let (x, y) = (2 * placement.x, 2 * placement.y);
        match depth {
            0 => x < n && y < n,
            1 => !(x >= n && y >= n),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_piece_barred_from_first_column() {
        let breaker = SymmetryBreaker::default();
        let left = PiecePlacement::new(PieceKind::I, 0, 0, 0);
        let inner = PiecePlacement::new(PieceKind::I, 0, 1, 0);
        for depth in 0..4 {
            assert!(!breaker.is_allowed(&left, depth, 6));
        }
        assert!(breaker.is_allowed(&inner, 0, 6));
        assert!(breaker.is_allowed(&PiecePlacement::new(PieceKind::O, 0, 0, 0), 3, 6));
    }

    #[test]
    fn test_first_piece_in_upper_left_quadrant() {
        let breaker = SymmetryBreaker::default();
        let at = |x, y| PiecePlacement::new(PieceKind::T, 0, x, y);
        assert!(breaker.is_allowed(&at(0, 0), 0, 6));
        assert!(breaker.is_allowed(&at(2, 2), 0, 6));
        assert!(!breaker.is_allowed(&at(3, 0), 0, 6));
        assert!(!breaker.is_allowed(&at(0, 3), 0, 6));
    }

    #[test]
    fn test_odd_grid_quadrants_include_middle_line() {
        let breaker = SymmetryBreaker::default();
        let at = |x, y| PiecePlacement::new(PieceKind::T, 0, x, y);
        assert!(breaker.is_allowed(&at(2, 2), 0, 5));
        assert!(breaker.is_allowed(&at(2, 0), 0, 5));
        assert!(!breaker.is_allowed(&at(3, 0), 0, 5));
        assert!(!breaker.is_allowed(&at(0, 3), 0, 5));

        assert!(breaker.is_allowed(&at(2, 2), 1, 5));
        assert!(breaker.is_allowed(&at(3, 2), 1, 5));
        assert!(!breaker.is_allowed(&at(3, 3), 1, 5));
        assert!(breaker.is_allowed(&at(3, 3), 1, 7));
        assert!(!breaker.is_allowed(&at(4, 4), 1, 7));
    }

    #[test]
    fn test_second_piece_not_in_lower_right_quadrant() {
        let breaker = SymmetryBreaker::default();
        let at = |x, y| PiecePlacement::new(PieceKind::L, 1, x, y);
        assert!(!breaker.is_allowed(&at(2, 2), 1, 4));
        assert!(breaker.is_allowed(&at(2, 0), 1, 4));
        assert!(breaker.is_allowed(&at(0, 2), 1, 4));
        assert!(breaker.is_allowed(&at(2, 2), 2, 4));
    }

    #[test]
    fn test_disabled_allows_everything() {
        let breaker = SymmetryBreaker::disabled();
        let left = PiecePlacement::new(PieceKind::I, 0, 0, 0);
        let far = PiecePlacement::new(PieceKind::O, 0, 2, 2);
        assert!(breaker.is_allowed(&left, 0, 4));
        assert!(breaker.is_allowed(&far, 0, 4));
        assert!(breaker.is_allowed(&far, 1, 4));
    }
}
