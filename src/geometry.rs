//! 2D rotation and symmetry utilities.
//!
//! A square has 8 symmetries: 4 rotations, each optionally followed by a
//! mirror. Piece shapes only ever rotate (a mirrored L is a J), while whole
//! boards are compared under all 8.

use crate::pieces::Offset;

/// The four quarter-turn rotations of a block offset, y pointing down.
pub const ROTATIONS: [fn(Offset) -> Offset; 4] = [
    |(x, y)| (x, y),   // 0 degrees
    |(x, y)| (-y, x),  // 90 degrees clockwise
    |(x, y)| (-x, -y), // 180 degrees
    |(x, y)| (y, -x),  // 270 degrees
];

/// The eight symmetries of an `n x n` board as cell mappings.
///
/// Each function takes `(x, y, last)` with `last = n - 1` and returns the
/// destination cell. Indices 4-7 include a mirror, so piece kinds must be
/// swapped with their mirror images when they are applied to a tiling.
///
/// Ordering note: `is_reflection` relies on the mirrored entries coming last.
pub const BOARD_SYMMETRIES: [fn(i32, i32, i32) -> (i32, i32); 8] = [
    |x, y, _| (x, y),
    |x, y, last| (last - y, x),
    |x, y, last| (last - x, last - y),
    |x, y, last| (y, last - x),
    |x, y, last| (last - x, y),
    |x, y, last| (x, last - y),
    |x, y, _| (y, x),
    |x, y, last| (last - y, last - x),
];

/// Whether the board symmetry at `index` mirrors the board.
#[inline]
pub const fn is_reflection(index: usize) -> bool {
    index >= 4
}

/// Generates all unique orientations of a shape under rotation.
///
/// Each orientation is normalized to the origin and its blocks sorted, so two
/// orientations covering the same cells compare equal.
pub fn all_orientations(shape: &[Offset]) -> Vec<Vec<Offset>> {
    let mut orientations: Vec<Vec<Offset>> = ROTATIONS
        .iter()
        .map(|rotate| {
            let rotated: Vec<Offset> = shape.iter().map(|&offset| rotate(offset)).collect();
            let mut normalized = normalize_to_origin(rotated);
            normalized.sort();
            normalized
        })
        .collect();

    // symmetric shapes produce duplicates
    orientations.sort();
    orientations.dedup();
    orientations
}

/// Translates offsets so the minimum x and y values are both zero.
pub fn normalize_to_origin(mut offsets: Vec<Offset>) -> Vec<Offset> {
    let Some(min_x) = offsets.iter().map(|&(x, _)| x).min() else {
        return offsets;
    };
    let min_y = offsets.iter().map(|&(_, y)| y).min().unwrap_or(0);

    for (x, y) in &mut offsets {
        *x -= min_x;
        *y -= min_y;
    }

    offsets
}

/// Whether the blocks form one 4-connected group.
pub fn is_connected(blocks: &[Offset]) -> bool {
    let Some(&first) = blocks.first() else {
        return true;
    };

    let mut reached = vec![first];
    let mut frontier = vec![first];
    while let Some((x, y)) = frontier.pop() {
        for neighbor in [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)] {
            if blocks.contains(&neighbor) && !reached.contains(&neighbor) {
                reached.push(neighbor);
                frontier.push(neighbor);
            }
        }
    }

    blocks.iter().all(|block| reached.contains(block))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotations_cycle() {
        let offset = (2, 1);
        let mut current = offset;
        for _ in 0..4 {
            current = ROTATIONS[1](current);
        }
        assert_eq!(current, offset);
    }

    #[test]
    fn test_board_symmetries_are_permutations() {
        let n = 5;
        for (index, symmetry) in BOARD_SYMMETRIES.iter().enumerate() {
            let mut seen = [false; 25];
            for y in 0..n {
                for x in 0..n {
                    let (tx, ty) = symmetry(x, y, n - 1);
                    assert!((0..n).contains(&tx) && (0..n).contains(&ty));
                    let dest = (ty * n + tx) as usize;
                    assert!(!seen[dest], "symmetry {index} maps two cells to {dest}");
                    seen[dest] = true;
                }
            }
        }
    }

    #[test]
    fn test_orientation_counts() {
        let square = [(0, 0), (1, 0), (0, 1), (1, 1)];
        let line = [(0, 0), (0, 1), (0, 2), (0, 3)];
        let tee = [(1, 0), (0, 1), (1, 1), (2, 1)];
        let skew = [(1, 0), (2, 0), (0, 1), (1, 1)];
        assert_eq!(all_orientations(&square).len(), 1);
        assert_eq!(all_orientations(&line).len(), 2);
        assert_eq!(all_orientations(&tee).len(), 4);
        assert_eq!(all_orientations(&skew).len(), 2);
    }

    #[test]
    fn test_connectivity() {
        assert!(is_connected(&[(0, 0), (1, 0), (1, 1), (2, 1)]));
        assert!(!is_connected(&[(0, 0), (1, 1), (2, 2), (3, 3)]));
    }
}
