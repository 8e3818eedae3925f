//! Errors raised by the training loop.

use std::path::PathBuf;

use arena::ArenaError;
use engine_core::GameError;
use mcts::{EvaluatorError, SearchError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoachError {
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    #[error("arena failed: {0}")]
    Arena(#[from] ArenaError),

    #[error("evaluator failed: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error("game error: {0}")]
    Game(#[from] GameError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Saved examples expected alongside a checkpoint are missing.
    #[error("training examples not found at {0}")]
    PersistenceMissing(PathBuf),

    #[error("episode exceeded {limit} plies without finishing")]
    EpisodeTooLong { limit: u32 },

    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),

    #[error("shutdown requested")]
    Cancelled,
}
