//! Evaluator traits for position evaluation.
//!
//! The evaluator provides policy (action probabilities) and value estimates
//! for canonical boards. During training the evaluator is also the model being
//! improved, so a second trait covers fitting and snapshot persistence.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use engine_core::Board;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during evaluation, training or persistence.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot format error in {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Shape mismatch: {0}")]
    Shape(String),

    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),
}

/// Result of evaluating a canonical board.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalResult {
    /// Prior over all action indices, not yet masked by legality.
    pub policy: Vec<f32>,

    /// Value estimate for the player to move.
    /// Range: -1.0 (certain loss) to +1.0 (certain win).
    pub value: f32,
}

/// One labelled position produced by self-play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    /// Canonical board (player to move is `BLACK`).
    pub board: Board,
    /// Search policy target over all actions.
    pub policy: Vec<f32>,
    /// Final outcome from the mover's perspective.
    pub value: f32,
}

/// Summary of one `train` call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrainingReport {
    pub examples: usize,
    pub epochs: u32,
    /// Mean policy cross-entropy over the final epoch.
    pub policy_loss: f32,
    /// Mean squared value error over the final epoch.
    pub value_loss: f32,
}

/// Policy/value oracle consulted by the search.
///
/// Implementations:
/// - [`UniformEvaluator`]: uniform prior and zero value (for testing)
/// - [`crate::LinearEvaluator`]: trainable linear model
pub trait Evaluator: Send + Sync {
    /// Evaluate a canonical board.
    fn predict(&self, board: &Board) -> Result<EvalResult, EvaluatorError>;

    /// Number of action indices the policy covers.
    fn action_size(&self) -> usize;
}

/// An evaluator that can be fitted to examples and persisted.
///
/// `Clone` provides the in-memory "previous" copy kept while a candidate is
/// trained and gated.
pub trait TrainableEvaluator: Evaluator + Clone {
    /// Fit the model in place to `examples`, visited in the given order.
    fn train(&mut self, examples: &[TrainingExample]) -> Result<TrainingReport, EvaluatorError>;

    /// Write the current parameters to `path`.
    fn save_snapshot(&self, path: &Path) -> Result<(), EvaluatorError>;

    /// Replace the current parameters with those stored at `path`.
    fn load_snapshot(&mut self, path: &Path) -> Result<(), EvaluatorError>;
}

/// Serialize `value` as pretty JSON to `path` (write-then-rename).
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), EvaluatorError> {
    let json = serde_json::to_vec_pretty(value).map_err(|source| EvaluatorError::Format {
        path: path.to_path_buf(),
        source,
    })?;

    let io_err = |source| EvaluatorError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    let temp_path = PathBuf::from(temp_path);

    let mut file = fs::File::create(&temp_path).map_err(io_err)?;
    file.write_all(&json).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    drop(file);

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(io_err(e));
    }
    Ok(())
}

/// Read a JSON document written by [`write_json_atomic`].
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, EvaluatorError> {
    let bytes = fs::read(path).map_err(|source| EvaluatorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| EvaluatorError::Format {
        path: path.to_path_buf(),
        source,
    })
}

/// Uniform evaluator that assigns equal probability to every action.
/// Value is always 0.0 (neutral). Useful for testing MCTS without a model;
/// the search applies the legality mask.
#[derive(Debug, Clone)]
pub struct UniformEvaluator {
    action_size: usize,
}

impl UniformEvaluator {
    pub fn new(action_size: usize) -> Self {
        Self { action_size }
    }
}

impl Evaluator for UniformEvaluator {
    fn predict(&self, _board: &Board) -> Result<EvalResult, EvaluatorError> {
        if self.action_size == 0 {
            return Err(EvaluatorError::Shape("action size is zero".to_string()));
        }
        let p = 1.0 / self.action_size as f32;
        Ok(EvalResult {
            policy: vec![p; self.action_size],
            value: 0.0,
        })
    }

    fn action_size(&self) -> usize {
        self.action_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_evaluator() {
        let eval = UniformEvaluator::new(4);
        let result = eval.predict(&Board::new(2)).unwrap();

        assert_eq!(result.policy.len(), 4);
        for p in &result.policy {
            assert!((p - 0.25).abs() < 1e-6);
        }
        assert!((result.value).abs() < 1e-6);
        assert_eq!(eval.action_size(), 4);
    }

    #[test]
    fn test_uniform_evaluator_zero_actions() {
        let eval = UniformEvaluator::new(0);
        assert!(matches!(
            eval.predict(&Board::new(2)),
            Err(EvaluatorError::Shape(_))
        ));
    }

    #[test]
    fn test_json_roundtrip_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("example.json");
        let example = TrainingExample {
            board: Board::new(2),
            policy: vec![0.5, 0.5, 0.0, 0.0, 0.0],
            value: -1.0,
        };

        write_json_atomic(&path, &example).unwrap();
        let loaded: TrainingExample = read_json(&path).unwrap();
        assert_eq!(loaded, example);
        assert!(!dir.path().join("example.json.tmp").exists());

        let missing = read_json::<TrainingExample>(&dir.path().join("nope.json"));
        assert!(matches!(missing, Err(EvaluatorError::Io { .. })));
    }

    #[test]
    fn test_write_to_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("x.json");
        let err = write_json_atomic(&path, &1u32).unwrap_err();
        assert!(matches!(err, EvaluatorError::Io { .. }));
    }
}
