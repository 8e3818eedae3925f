//! Territory game implementation for the Zeroplay engine
//!
//! A Go-like placement game on an `n` x `n` board (default 9x9). Players
//! alternately place a stone on any empty cell; stones are never captured and
//! passing is not allowed.
//!
//! # Scoring
//!
//! Empty regions bordered by a single colour and not touching the edge are
//! that colour's territory (see [`scorer`]). The game is over as soon as no
//! neutral empty cell remains, even with empty cells left on the board. It
//! does not wait for the board to fill: a full board has no territory and
//! always goes to White. Black wins when its territory exceeds White's by at
//! least [`scorer::BLACK_MARGIN`]; otherwise White wins, so there are no draws.
//!
//! # Usage
//!
//! ```rust
//! use engine_core::{Game, Player};
//! use games_territory::Territory;
//!
//! let game = Territory::new(9).unwrap();
//! let board = game.initial_board();
//! assert_eq!(game.legal_actions(&board, Player::Black).count(), 81);
//! ```

pub mod scorer;

use engine_core::{ActionMask, Board, Game, GameError, Outcome, Player, EMPTY};

pub use scorer::{score_territory, winner_by_margin, TerritoryScore, BLACK_MARGIN};

/// Default side length used by the training loop.
pub const DEFAULT_SIZE: usize = 9;

/// Territory game rules for an `n` x `n` board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Territory {
    n: usize,
}

impl Territory {
    /// Create rules for an `n` x `n` board. `n` must be at least 3 so that an
    /// interior cell exists.
    pub fn new(n: usize) -> Result<Self, GameError> {
        if n < 3 {
            return Err(GameError::InvalidBoard(format!(
                "territory board size must be >= 3, got {n}"
            )));
        }
        Ok(Self { n })
    }

    pub fn size(&self) -> usize {
        self.n
    }
}

impl Default for Territory {
    fn default() -> Self {
        Self { n: DEFAULT_SIZE }
    }
}

impl Game for Territory {
    fn env_id(&self) -> &'static str {
        "territory"
    }

    fn initial_board(&self) -> Board {
        Board::new(self.n)
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
        if action == self.pass_action() {
            return Err(GameError::InvalidMove {
                action,
                reason: "pass is not allowed".to_string(),
            });
        }
        let (row, col) = (action / self.n, action % self.n);
        if board.get(row, col) != EMPTY {
            return Err(GameError::InvalidMove {
                action,
                reason: "cell occupied".to_string(),
            });
        }
        let mut next = board.clone();
        next.set(row, col, player.sign());
        Ok((next, player.opponent()))
    }

    fn legal_actions(&self, board: &Board, _player: Player) -> ActionMask {
        let mut bits: Vec<bool> = board.cells().iter().map(|&c| c == EMPTY).collect();
        bits.push(false);
        ActionMask::new(bits)
    }

    fn outcome(&self, board: &Board, player: Player) -> Outcome {
        if score_territory(board).neutral > 0 {
            return Outcome::Ongoing;
        }
        if winner_by_margin(board) == player.sign() {
            Outcome::Win
        } else {
            Outcome::Loss
        }
    }

    /// Territory margin from `player`'s side.
    fn score(&self, board: &Board, player: Player) -> i32 {
        score_territory(board).margin() * player.sign() as i32
    }
}

#[cfg(test)]
mod tests;
