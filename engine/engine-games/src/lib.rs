//! Game selection for the Zeroplay engine
//!
//! This crate provides a single entry point for constructing any available
//! game from its environment id, as used in configuration files and CLIs.
//!
//! # Usage
//!
//! ```rust
//! use engine_core::Game;
//! use engine_games::create_game;
//!
//! let game = create_game("othello", 6).unwrap();
//! assert_eq!(game.action_size(), 37);
//! ```

use engine_core::{ActionMask, Board, Fingerprint, Game, GameError, Outcome, Player};
use games_othello::Othello;
use games_territory::Territory;
use thiserror::Error;

pub use games_othello::DEFAULT_SIZE as OTHELLO_DEFAULT_SIZE;
pub use games_territory::DEFAULT_SIZE as TERRITORY_DEFAULT_SIZE;

/// Environment ids accepted by [`create_game`].
pub const AVAILABLE_GAMES: &[&str] = &["othello", "territory"];

#[derive(Debug, Error)]
pub enum GameSelectError {
    #[error("unknown game '{0}' (available: othello, territory)")]
    UnknownGame(String),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// Any registered game, dispatched statically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnyGame {
    Othello(Othello),
    Territory(Territory),
}

/// Default board side length of `env_id`.
pub fn default_size(env_id: &str) -> Option<usize> {
    match env_id {
        "othello" => Some(OTHELLO_DEFAULT_SIZE),
        "territory" => Some(TERRITORY_DEFAULT_SIZE),
        _ => None,
    }
}

/// Construct the game named `env_id` on an `size` x `size` board. A size of
/// 0 selects the game's default.
pub fn create_game(env_id: &str, size: usize) -> Result<AnyGame, GameSelectError> {
    let size = match size {
        0 => default_size(env_id)
            .ok_or_else(|| GameSelectError::UnknownGame(env_id.to_string()))?,
        n => n,
    };
    match env_id {
        "othello" => Ok(AnyGame::Othello(Othello::new(size)?)),
        "territory" => Ok(AnyGame::Territory(Territory::new(size)?)),
        other => Err(GameSelectError::UnknownGame(other.to_string())),
    }
}

/// Whether `env_id` names an available game.
pub fn is_available(env_id: &str) -> bool {
    AVAILABLE_GAMES.contains(&env_id)
}

macro_rules! dispatch {
    ($self:ident, $game:ident => $body:expr) => {
        match $self {
            AnyGame::Othello($game) => $body,
            AnyGame::Territory($game) => $body,
        }
    };
}

impl Game for AnyGame {
    fn env_id(&self) -> &'static str {
        dispatch!(self, g => g.env_id())
    }

    fn initial_board(&self) -> Board {
        dispatch!(self, g => g.initial_board())
    }

    fn board_dimensions(&self) -> (usize, usize) {
        dispatch!(self, g => g.board_dimensions())
    }

    fn action_size(&self) -> usize {
        dispatch!(self, g => g.action_size())
    }

    fn pass_action(&self) -> usize {
        dispatch!(self, g => g.pass_action())
    }

    fn next_state(
        &self,
        board: &Board,
        player: Player,
        action: usize,
    ) -> Result<(Board, Player), GameError> {
        dispatch!(self, g => g.next_state(board, player, action))
    }

    fn legal_actions(&self, board: &Board, player: Player) -> ActionMask {
        dispatch!(self, g => g.legal_actions(board, player))
    }

    fn outcome(&self, board: &Board, player: Player) -> Outcome {
        dispatch!(self, g => g.outcome(board, player))
    }

    fn canonical_form(&self, board: &Board, player: Player) -> Board {
        dispatch!(self, g => g.canonical_form(board, player))
    }

    fn symmetries(&self, board: &Board, policy: &[f32]) -> Vec<(Board, Vec<f32>)> {
        dispatch!(self, g => g.symmetries(board, policy))
    }

    fn fingerprint(&self, board: &Board) -> Fingerprint {
        dispatch!(self, g => g.fingerprint(board))
    }

    fn score(&self, board: &Board, player: Player) -> i32 {
        dispatch!(self, g => g.score(board, player))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_all_games() {
        for &id in AVAILABLE_GAMES {
            let size = if id == "othello" { 6 } else { 9 };
            let game = create_game(id, size).unwrap();
            assert_eq!(game.env_id(), id);
            assert_eq!(game.action_size(), size * size + 1);
            assert!(is_available(id));
        }
    }

    #[test]
    fn test_unknown_game() {
        let err = create_game("chess", 8).unwrap_err();
        assert!(matches!(err, GameSelectError::UnknownGame(_)));
        assert!(!is_available("chess"));
    }

    #[test]
    fn test_zero_size_selects_default() {
        let game = create_game("othello", 0).unwrap();
        let (rows, _) = game.board_dimensions();
        assert_eq!(rows, OTHELLO_DEFAULT_SIZE);
        assert_eq!(default_size("territory"), Some(TERRITORY_DEFAULT_SIZE));
        assert_eq!(default_size("chess"), None);
        assert!(matches!(
            create_game("chess", 0).unwrap_err(),
            GameSelectError::UnknownGame(_)
        ));
    }

    #[test]
    fn test_invalid_size_propagates() {
        let err = create_game("othello", 7).unwrap_err();
        assert!(matches!(err, GameSelectError::Game(GameError::InvalidBoard(_))));
    }

    #[test]
    fn test_dispatch_matches_inner_game() {
        let game = create_game("othello", 6).unwrap();
        let inner = Othello::new(6).unwrap();
        let board = game.initial_board();
        assert_eq!(board, inner.initial_board());
        assert_eq!(
            game.legal_actions(&board, Player::Black),
            inner.legal_actions(&board, Player::Black)
        );
        assert_eq!(game.symmetries(&board, &[0.0; 37]).len(), 8);
    }
}
