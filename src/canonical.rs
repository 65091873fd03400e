//! Canonical identities for completed tilings.
//!
//! A tiling is painted onto a matrix of piece indices, which makes its
//! identity independent of the order the placements were found in.

use crate::geometry::{is_reflection, BOARD_SYMMETRIES};
use crate::grid::cell_index;
use crate::pieces::{PieceKind, PiecePlacement, EMPTY_CELL_INDEX};

/// Paints each cell with the index of the piece covering it.
///
/// Row-major; uncovered and sentinel cells hold `-1`.
pub fn paint(solution: &[PiecePlacement], grid_size: usize) -> Vec<i32> {
    let mut cells = vec![EMPTY_CELL_INDEX; grid_size * grid_size];
    let limit = grid_size as i32;

    for placement in solution {
        let Some(blocks) = placement.cells() else {
            continue;
        };
        for (x, y) in blocks {
            if (0..limit).contains(&x) && (0..limit).contains(&y) {
                cells[cell_index(x as usize, y as usize, grid_size)] = placement.piece_index;
            }
        }
    }

    cells
}

/// Serializes painted cells: fixed-width 2-digit cells separated by `,`,
/// rows separated by `|`.
fn serialize(cells: &[i32], grid_size: usize) -> String {
    cells
        .chunks(grid_size)
        .map(|row| {
            row.iter()
                .map(|cell| format!("{cell:02}"))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// Identity string of a tiling, independent of placement order.
///
/// Two solutions share a key iff every cell is covered by the same piece
/// kind (or is uncovered) in both.
pub fn canonical_key(solution: &[PiecePlacement], grid_size: usize) -> String {
    serialize(&paint(solution, grid_size), grid_size)
}

/// Identity string shared by a tiling and its rotations and reflections.
///
/// Reflections turn L into J and S into Z, so those kinds are exchanged
/// before the mirrored matrices are compared.
pub fn symmetric_key(solution: &[PiecePlacement], grid_size: usize) -> String {
    let original = paint(solution, grid_size);
    let last = grid_size as i32 - 1;
    let mut smallest = original.clone();

    for (index, symmetry) in BOARD_SYMMETRIES.iter().enumerate().skip(1) {
        let mut transformed = vec![EMPTY_CELL_INDEX; original.len()];
        for (cell, &value) in original.iter().enumerate() {
            let x = (cell % grid_size) as i32;
            let y = (cell / grid_size) as i32;
            let (tx, ty) = symmetry(x, y, last);
            let value = if is_reflection(index) {
                PieceKind::from_index(value).map_or(value, |kind| kind.mirrored().index() as i32)
            } else {
                value
            };
            transformed[cell_index(tx as usize, ty as usize, grid_size)] = value;
        }

        if transformed < smallest {
            smallest = transformed;
        }
    }

    serialize(&smallest, grid_size)
}
