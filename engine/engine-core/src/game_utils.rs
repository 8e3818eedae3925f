//! Shared utilities for square-grid game implementations
//!
//! Grid transforms used by boards and by games that expose the dihedral
//! symmetry group for training-data augmentation.

use crate::board::Board;

/// Rotate a row-major `n` x `n` grid 90 degrees counter-clockwise.
///
/// `out[i][j] = grid[j][n - 1 - i]`
pub fn rotate_grid<T: Copy>(grid: &[T], n: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(grid.len());
    for i in 0..n {
        for j in 0..n {
            out.push(grid[j * n + (n - 1 - i)]);
        }
    }
    out
}

/// Mirror a row-major `n` x `n` grid left to right.
pub fn flip_grid_lr<T: Copy>(grid: &[T], n: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(grid.len());
    for i in 0..n {
        for j in 0..n {
            out.push(grid[i * n + (n - 1 - j)]);
        }
    }
    out
}

/// All eight dihedral transforms of a board and its policy.
///
/// `policy` holds one entry per cell followed by any trailing non-spatial
/// actions (pass), which are carried through unchanged. Ordering: for each
/// quarter turn `k = 1..=4`, the mirrored variant followed by the plain
/// rotation. The final pair is therefore the identity.
///
/// # Example
/// ```
/// use engine_core::{dihedral_symmetries, Board};
///
/// let board = Board::new(4);
/// let policy = vec![1.0 / 17.0; 17];
/// let syms = dihedral_symmetries(&board, &policy);
/// assert_eq!(syms.len(), 8);
/// assert_eq!(syms[7].1, policy);
/// ```
pub fn dihedral_symmetries(board: &Board, policy: &[f32]) -> Vec<(Board, Vec<f32>)> {
    let n = board.size();
    let cells = n * n;
    debug_assert!(policy.len() >= cells, "policy shorter than board");
    let (spatial, tail) = policy.split_at(cells.min(policy.len()));

    let mut out = Vec::with_capacity(8);
    let mut rot_board = board.clone();
    let mut rot_pi = spatial.to_vec();
    for _ in 0..4 {
        rot_board = rot_board.rotate90();
        rot_pi = rotate_grid(&rot_pi, n);

        let mut flipped_pi = flip_grid_lr(&rot_pi, n);
        flipped_pi.extend_from_slice(tail);
        out.push((rot_board.flip_lr(), flipped_pi));

        let mut plain_pi = rot_pi.clone();
        plain_pi.extend_from_slice(tail);
        out.push((rot_board.clone(), plain_pi));
    }
    out
}
