//! Strategy capabilities used by the arena.

use engine_core::{Board, GameError};
use mcts::SearchError;
use thiserror::Error;

/// Errors raised by a strategy while choosing or observing moves.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    #[error("game error: {0}")]
    Game(#[from] GameError),

    #[error("no legal action available")]
    NoLegalMoves,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("input closed")]
    InputClosed,
}

/// Optional per-game hooks. Every hook defaults to a no-op.
pub trait Lifecycle {
    /// Called before the first move of each game.
    fn start_game(&mut self) -> Result<(), StrategyError> {
        Ok(())
    }

    /// Called after each game, including games aborted by an error.
    fn end_game(&mut self) -> Result<(), StrategyError> {
        Ok(())
    }

    /// Called with the board before the opponent's move and the action the
    /// opponent chose.
    fn notify(&mut self, _board: &Board, _action: usize) -> Result<(), StrategyError> {
        Ok(())
    }
}

/// Something that plays a game: given the canonical board (mover is `BLACK`),
/// pick an action index.
pub trait Strategy: Lifecycle {
    fn select_action(&mut self, board: &Board) -> Result<usize, StrategyError>;
}
