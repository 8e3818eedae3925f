//! Board representation shared by all square-grid games.
//!
//! Cells are stored in row-major order as small signed integers:
//! `EMPTY` (0), `BLACK` (+1) and `WHITE` (-1). Games may use additional
//! values for neutral cells; those are never touched by canonicalization.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game_utils::{flip_grid_lr, rotate_grid};

/// Empty cell.
pub const EMPTY: i8 = 0;
/// Stone of the first player (and of the mover on a canonical board).
pub const BLACK: i8 = 1;
/// Stone of the second player.
pub const WHITE: i8 = -1;

/// One of the two sides of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// Moves first, owns `BLACK` stones.
    Black,
    /// Moves second, owns `WHITE` stones.
    White,
}

impl Player {
    /// Signed stone value owned by this player.
    #[inline]
    pub fn sign(self) -> i8 {
        match self {
            Player::Black => BLACK,
            Player::White => WHITE,
        }
    }

    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Black => write!(f, "black"),
            Player::White => write!(f, "white"),
        }
    }
}

/// Exact, hashable serialization of a board's content.
///
/// Two boards share a fingerprint if and only if their cells are identical,
/// so cache lookups keyed by fingerprint never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(Box<[i8]>);

impl Fingerprint {
    pub fn as_slice(&self) -> &[i8] {
        &self.0
    }
}

/// Square game board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    cells: Vec<i8>,
}

impl Board {
    /// Create an empty `size` x `size` board.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![EMPTY; size * size],
        }
    }

    /// Build a board from row-major cells.
    ///
    /// Returns `None` when `cells.len()` is not `size * size`.
    pub fn from_cells(size: usize, cells: Vec<i8>) -> Option<Self> {
        if cells.len() != size * size {
            return None;
        }
        Some(Self { size, cells })
    }

    /// Side length of the board.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Row-major cell values.
    #[inline]
    pub fn cells(&self) -> &[i8] {
        &self.cells
    }

    /// Convert row and column to a cell index.
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> i8 {
        self.cells[self.index(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: i8) {
        let idx = self.index(row, col);
        self.cells[idx] = value;
    }

    /// Whether signed coordinates fall on the board.
    #[inline]
    pub fn in_bounds(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.size && (col as usize) < self.size
    }

    /// Number of cells holding `value`.
    pub fn count(&self, value: i8) -> usize {
        self.cells.iter().filter(|&&c| c == value).count()
    }

    /// True when no cell is empty.
    pub fn is_full(&self) -> bool {
        !self.cells.contains(&EMPTY)
    }

    /// Board seen from `player`'s side: that player's stones become `BLACK`.
    ///
    /// Canonicalizing an already canonical board for `Player::Black` is the
    /// identity.
    pub fn canonical(&self, player: Player) -> Board {
        let sign = player.sign();
        let cells = self
            .cells
            .iter()
            .map(|&c| if c == BLACK || c == WHITE { c * sign } else { c })
            .collect();
        Board {
            size: self.size,
            cells,
        }
    }

    /// Rotate 90 degrees counter-clockwise.
    pub fn rotate90(&self) -> Board {
        Board {
            size: self.size,
            cells: rotate_grid(&self.cells, self.size),
        }
    }

    /// Mirror left to right.
    pub fn flip_lr(&self) -> Board {
        Board {
            size: self.size,
            cells: flip_grid_lr(&self.cells, self.size),
        }
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint(self.cells.clone().into_boxed_slice())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..self.size {
            write!(f, "{} ", col)?;
        }
        writeln!(f)?;
        for row in 0..self.size {
            write!(f, "{:>2} ", row)?;
            for col in 0..self.size {
                let symbol = match self.get(row, col) {
                    BLACK => 'O',
                    WHITE => 'X',
                    EMPTY => '-',
                    _ => '#',
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
