//! Othello game implementation for the Zeroplay engine
//!
//! Othello is played on an even-sized square board. A move places a stone on
//! an empty cell so that at least one straight line of opponent stones is
//! bracketed between the new stone and another stone of the mover; every
//! bracketed stone is flipped.
//!
//! # Board Layout
//!
//! Row-major, `action = row * n + col`. Action `n * n` is pass, which is legal
//! only when the mover has no placing move. The game ends when neither side
//! can place a stone; the side with more stones wins. Equal counts are an
//! [`Outcome::Draw`](engine_core::Outcome::Draw) with value 0 for both sides,
//! not a loss for the player to move.
//!
//! ```text
//! 6x6 start:
//!    0 1 2 3 4 5
//!  0 - - - - - -
//!  1 - - - - - -
//!  2 - - X O - -
//!  3 - - O X - -
//!  4 - - - - - -
//!  5 - - - - - -
//! ```
//!
//! # Usage
//!
//! ```rust
//! use engine_core::{Game, Player};
//! use games_othello::Othello;
//!
//! let game = Othello::new(6).unwrap();
//! let board = game.initial_board();
//! let legal = game.legal_actions(&board, Player::Black);
//! assert_eq!(legal.count(), 4);
//! ```

use engine_core::{
    dihedral_symmetries, ActionMask, Board, Game, GameError, Outcome, Player, EMPTY,
};

/// Default side length used by the training loop.
pub const DEFAULT_SIZE: usize = 6;

const DIRECTIONS: [(isize, isize); 8] = [
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
];

/// Othello rules for an `n` x `n` board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Othello {
    n: usize,
}

impl Othello {
    /// Create rules for an `n` x `n` board. `n` must be even and at least 4.
    pub fn new(n: usize) -> Result<Self, GameError> {
        if n < 4 || n % 2 != 0 {
            return Err(GameError::InvalidBoard(format!(
                "othello board size must be even and >= 4, got {n}"
            )));
        }
        Ok(Self { n })
    }

    pub fn size(&self) -> usize {
        self.n
    }

    /// Stones flipped by `color` playing at `(row, col)`, excluding the
    /// placed stone itself. Empty when the move brackets nothing.
    fn flips(&self, board: &Board, row: usize, col: usize, color: i8) -> Vec<(usize, usize)> {
        let mut flips = Vec::new();
        for &(dr, dc) in &DIRECTIONS {
            let mut line = Vec::new();
            let mut r = row as isize + dr;
            let mut c = col as isize + dc;
            while board.in_bounds(r, c) {
                let v = board.get(r as usize, c as usize);
                if v == -color {
                    line.push((r as usize, c as usize));
                } else {
                    if v == color && !line.is_empty() {
                        flips.extend_from_slice(&line);
                    }
                    break;
                }
                r += dr;
                c += dc;
            }
        }
        flips
    }

    fn is_placing_move(&self, board: &Board, row: usize, col: usize, color: i8) -> bool {
        board.get(row, col) == EMPTY && !self.flips(board, row, col, color).is_empty()
    }

    fn has_placing_move(&self, board: &Board, color: i8) -> bool {
        (0..self.n).any(|r| (0..self.n).any(|c| self.is_placing_move(board, r, c, color)))
    }

    /// Stone difference from `color`'s side.
    pub fn count_diff(&self, board: &Board, color: i8) -> i32 {
        board.count(color) as i32 - board.count(-color) as i32
    }
}

impl Default for Othello {
    fn default() -> Self {
        Self { n: DEFAULT_SIZE }
    }
}

impl Game for Othello {
    fn env_id(&self) -> &'static str {
        "othello"
    }

    fn initial_board(&self) -> Board {
        let n = self.n;
        let mut board = Board::new(n);
        board.set(n / 2 - 1, n / 2, Player::Black.sign());
        board.set(n / 2, n / 2 - 1, Player::Black.sign());
        board.set(n / 2 - 1, n / 2 - 1, Player::White.sign());
        board.set(n / 2, n / 2, Player::White.sign());
        board
    }

    fn board_dimensions(&self) -> (usize, usize) {
        (self.n, self.n)
    }

    fn action_size(&self) -> usize {
        self.n * self.n + 1
    }

    fn next_state(
        &self,
        board: &Board,
        player: Player,
        action: usize,
    ) -> Result<(Board, Player), GameError> {
        self.check_action(action)?;
        let color = player.sign();

        if action == self.pass_action() {
            if self.has_placing_move(board, color) {
                return Err(GameError::InvalidMove {
                    action,
                    reason: "pass while a placing move exists".to_string(),
                });
            }
            return Ok((board.clone(), player.opponent()));
        }

        let (row, col) = (action / self.n, action % self.n);
        if board.get(row, col) != EMPTY {
            return Err(GameError::InvalidMove {
                action,
                reason: "cell occupied".to_string(),
            });
        }
        let flips = self.flips(board, row, col, color);
        if flips.is_empty() {
            return Err(GameError::InvalidMove {
                action,
                reason: "no stones flipped".to_string(),
            });
        }

        let mut next = board.clone();
        next.set(row, col, color);
        for (r, c) in flips {
            next.set(r, c, color);
        }
        Ok((next, player.opponent()))
    }

    fn legal_actions(&self, board: &Board, player: Player) -> ActionMask {
        let color = player.sign();
        let mut mask = ActionMask::none(self.action_size());
        for r in 0..self.n {
            for c in 0..self.n {
                if self.is_placing_move(board, r, c, color) {
                    mask.set(r * self.n + c, true);
                }
            }
        }
        if !mask.any() {
            mask.set(self.pass_action(), true);
        }
        mask
    }

    fn outcome(&self, board: &Board, player: Player) -> Outcome {
        let color = player.sign();
        if self.has_placing_move(board, color) || self.has_placing_move(board, -color) {
            return Outcome::Ongoing;
        }
        match self.count_diff(board, color) {
            d if d > 0 => Outcome::Win,
            d if d < 0 => Outcome::Loss,
            _ => Outcome::Draw,
        }
    }

    fn symmetries(&self, board: &Board, policy: &[f32]) -> Vec<(Board, Vec<f32>)> {
        dihedral_symmetries(board, policy)
    }

    fn score(&self, board: &Board, player: Player) -> i32 {
        self.count_diff(board, player.sign())
    }
}
