//! The `Game` trait every rule set implements, plus the values it trades in.

use std::fmt;

use thiserror::Error;

use crate::board::{Board, Fingerprint, Player};

/// Errors from game rules.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid move {action}: {reason}")]
    InvalidMove { action: usize, reason: String },

    #[error("action {action} out of range (action size {action_size})")]
    ActionOutOfRange { action: usize, action_size: usize },

    #[error("invalid board: {0}")]
    InvalidBoard(String),
}

/// Result of a position, from the perspective of a given player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Ongoing,
    Win,
    Loss,
    Draw,
}

impl Outcome {
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }

    /// Scalar value: +1 win, -1 loss, 0 draw or ongoing.
    #[inline]
    pub fn value(self) -> f32 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Loss => -1.0,
            Outcome::Draw | Outcome::Ongoing => 0.0,
        }
    }

    /// The same result seen from the other side.
    #[inline]
    pub fn flipped(self) -> Outcome {
        match self {
            Outcome::Win => Outcome::Loss,
            Outcome::Loss => Outcome::Win,
            other => other,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Ongoing => "ongoing",
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::Draw => "draw",
        };
        f.write_str(s)
    }
}

/// Legal-move mask with one entry per action index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMask(Vec<bool>);

impl ActionMask {
    pub fn new(bits: Vec<bool>) -> Self {
        Self(bits)
    }

    /// All actions illegal.
    pub fn none(action_size: usize) -> Self {
        Self(vec![false; action_size])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Out-of-range indices are illegal.
    #[inline]
    pub fn is_legal(&self, action: usize) -> bool {
        self.0.get(action).copied().unwrap_or(false)
    }

    #[inline]
    pub fn set(&mut self, action: usize, legal: bool) {
        if let Some(bit) = self.0.get_mut(action) {
            *bit = legal;
        }
    }

    /// Number of legal actions.
    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|&b| b)
    }

    /// Iterate over legal action indices in ascending order.
    pub fn legal_actions(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| if b { Some(i) } else { None })
    }

    /// 1.0 for legal, 0.0 for illegal.
    pub fn to_f32(&self) -> Vec<f32> {
        self.0.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

/// Rules of a two-player, perfect-information, zero-sum board game.
///
/// Implementations are stateless: every method is a pure function of its
/// arguments, so a single game value can be shared freely across threads.
///
/// Action indices run over `0..action_size()`. Board cells map to
/// `row * size + col`; the pass action, when the game has one, is the final
/// index.
pub trait Game: Send + Sync + fmt::Debug {
    /// Stable identifier, e.g. `"othello"`.
    fn env_id(&self) -> &'static str;

    /// Starting position. Black moves first.
    fn initial_board(&self) -> Board;

    /// `(rows, cols)` of the board.
    fn board_dimensions(&self) -> (usize, usize);

    /// Total number of action indices, including pass.
    fn action_size(&self) -> usize;

    /// Index of the pass action.
    fn pass_action(&self) -> usize {
        self.action_size() - 1
    }

    /// Apply `action` for `player`, returning the new board and next mover.
    fn next_state(
        &self,
        board: &Board,
        player: Player,
        action: usize,
    ) -> Result<(Board, Player), GameError>;

    /// Legal actions for `player` on `board`.
    fn legal_actions(&self, board: &Board, player: Player) -> ActionMask;

    /// Result of `board` from `player`'s perspective.
    fn outcome(&self, board: &Board, player: Player) -> Outcome;

    /// Board seen from `player`'s side, with that player as `BLACK`.
    fn canonical_form(&self, board: &Board, player: Player) -> Board {
        board.canonical(player)
    }

    /// Equivalent `(board, policy)` pairs. Always contains at least the
    /// identity.
    fn symmetries(&self, board: &Board, policy: &[f32]) -> Vec<(Board, Vec<f32>)> {
        vec![(board.clone(), policy.to_vec())]
    }

    fn fingerprint(&self, board: &Board) -> Fingerprint {
        board.fingerprint()
    }

    /// Heuristic score of `board` for `player`; higher is better.
    fn score(&self, board: &Board, player: Player) -> i32;

    /// Map a cell action to `(row, col)`; `None` for pass or out of range.
    fn action_to_coords(&self, action: usize) -> Option<(usize, usize)> {
        let (rows, cols) = self.board_dimensions();
        if action < rows * cols {
            Some((action / cols, action % cols))
        } else {
            None
        }
    }

    /// Inverse of `action_to_coords`.
    fn coords_to_action(&self, row: usize, col: usize) -> Option<usize> {
        let (rows, cols) = self.board_dimensions();
        if row < rows && col < cols {
            Some(row * cols + col)
        } else {
            None
        }
    }

    /// Checked action lookup used by `next_state` implementations.
    fn check_action(&self, action: usize) -> Result<(), GameError> {
        if action >= self.action_size() {
            return Err(GameError::ActionOutOfRange {
                action,
                action_size: self.action_size(),
            });
        }
        Ok(())
    }
}

impl<G: Game + ?Sized> Game for &G {
    fn env_id(&self) -> &'static str {
        (**self).env_id()
    }
    fn initial_board(&self) -> Board {
        (**self).initial_board()
    }
    fn board_dimensions(&self) -> (usize, usize) {
        (**self).board_dimensions()
    }
    fn action_size(&self) -> usize {
        (**self).action_size()
    }
    fn pass_action(&self) -> usize {
        (**self).pass_action()
    }
    fn next_state(
        &self,
        board: &Board,
        player: Player,
        action: usize,
    ) -> Result<(Board, Player), GameError> {
        (**self).next_state(board, player, action)
    }
    fn legal_actions(&self, board: &Board, player: Player) -> ActionMask {
        (**self).legal_actions(board, player)
    }
    fn outcome(&self, board: &Board, player: Player) -> Outcome {
        (**self).outcome(board, player)
    }
    fn canonical_form(&self, board: &Board, player: Player) -> Board {
        (**self).canonical_form(board, player)
    }
    fn symmetries(&self, board: &Board, policy: &[f32]) -> Vec<(Board, Vec<f32>)> {
        (**self).symmetries(board, policy)
    }
    fn fingerprint(&self, board: &Board) -> Fingerprint {
        (**self).fingerprint(board)
    }
    fn score(&self, board: &Board, player: Player) -> i32 {
        (**self).score(board, player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_values() {
        assert_eq!(Outcome::Win.value(), 1.0);
        assert_eq!(Outcome::Loss.value(), -1.0);
        assert_eq!(Outcome::Draw.value(), 0.0);
        assert_eq!(Outcome::Ongoing.value(), 0.0);
        assert!(!Outcome::Ongoing.is_terminal());
        assert!(Outcome::Draw.is_terminal());
    }

    #[test]
    fn test_outcome_flipped() {
        assert_eq!(Outcome::Win.flipped(), Outcome::Loss);
        assert_eq!(Outcome::Loss.flipped(), Outcome::Win);
        assert_eq!(Outcome::Draw.flipped(), Outcome::Draw);
        assert_eq!(Outcome::Ongoing.flipped(), Outcome::Ongoing);
    }

    #[test]
    fn test_action_mask_queries() {
        let mask = ActionMask::new(vec![false, true, false, true]);
        assert_eq!(mask.len(), 4);
        assert_eq!(mask.count(), 2);
        assert!(mask.any());
        assert!(mask.is_legal(1));
        assert!(!mask.is_legal(2));
        assert!(!mask.is_legal(99));
        assert_eq!(mask.legal_actions().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(mask.to_f32(), vec![0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_action_mask_set_ignores_out_of_range() {
        let mut mask = ActionMask::none(3);
        assert!(!mask.any());
        mask.set(2, true);
        mask.set(10, true);
        assert_eq!(mask.count(), 1);
        assert!(mask.is_legal(2));
    }

    #[test]
    fn test_game_error_display() {
        let err = GameError::InvalidMove {
            action: 4,
            reason: "cell occupied".to_string(),
        };
        assert_eq!(err.to_string(), "invalid move 4: cell occupied");
    }
}
