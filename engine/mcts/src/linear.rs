//! Trainable linear policy/value model.
//!
//! Features are a one-hot encoding of the canonical board: for every cell one
//! input for the mover's stone and one for the opponent's, plus a bias. The
//! policy head is a softmax over `action_size` logits and the value head is a
//! `tanh` of a single linear unit. Training is plain minibatch SGD with L2
//! weight decay on cross-entropy plus squared value error.

use std::path::Path;

use engine_core::{Board, BLACK, WHITE};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::evaluator::{
    read_json, write_json_atomic, EvalResult, Evaluator, EvaluatorError, TrainableEvaluator,
    TrainingExample, TrainingReport,
};

/// Hyperparameters of [`LinearEvaluator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearConfig {
    pub learning_rate: f32,
    pub weight_decay: f32,
    pub epochs: u32,
    pub batch_size: usize,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.05,
            weight_decay: 1e-4,
            epochs: 10,
            batch_size: 64,
        }
    }
}

/// Persisted model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LinearParams {
    board_size: usize,
    action_size: usize,
    /// Row-major `action_size x num_features`.
    policy_weights: Vec<f32>,
    value_weights: Vec<f32>,
}

impl LinearParams {
    fn num_features(&self) -> usize {
        2 * self.board_size * self.board_size + 1
    }
}

/// Softmax-policy / tanh-value linear model.
#[derive(Debug, Clone)]
pub struct LinearEvaluator {
    params: LinearParams,
    config: LinearConfig,
}

impl LinearEvaluator {
    /// Randomly initialised model for `board_size` boards.
    pub fn new(
        board_size: usize,
        action_size: usize,
        config: LinearConfig,
        rng: &mut ChaCha20Rng,
    ) -> Self {
        let features = 2 * board_size * board_size + 1;
        let mut init = |len: usize| -> Vec<f32> {
            (0..len).map(|_| rng.gen_range(-0.01..0.01)).collect()
        };
        let params = LinearParams {
            board_size,
            action_size,
            policy_weights: init(action_size * features),
            value_weights: init(features),
        };
        Self { params, config }
    }

    pub fn config(&self) -> &LinearConfig {
        &self.config
    }

    pub fn board_size(&self) -> usize {
        self.params.board_size
    }

    /// Active feature indices of a canonical board; the bias is always last.
    fn features(&self, board: &Board) -> Result<Vec<usize>, EvaluatorError> {
        if board.size() != self.params.board_size {
            return Err(EvaluatorError::Shape(format!(
                "board size {} does not match model size {}",
                board.size(),
                self.params.board_size
            )));
        }
        let cells = board.cells().len();
        let mut active: Vec<usize> = board
            .cells()
            .iter()
            .enumerate()
            .filter_map(|(i, &c)| match c {
                BLACK => Some(i),
                WHITE => Some(cells + i),
                _ => None,
            })
            .collect();
        active.push(2 * cells);
        Ok(active)
    }

    /// Raw logits and the value pre-activation.
    fn forward(&self, active: &[usize]) -> (Vec<f32>, f32) {
        let f = self.params.num_features();
        let logits = (0..self.params.action_size)
            .map(|a| {
                let row = &self.params.policy_weights[a * f..(a + 1) * f];
                active.iter().map(|&i| row[i]).sum()
            })
            .collect();
        let value_pre = active.iter().map(|&i| self.params.value_weights[i]).sum();
        (logits, value_pre)
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&z| (z - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

impl Evaluator for LinearEvaluator {
    fn predict(&self, board: &Board) -> Result<EvalResult, EvaluatorError> {
        let active = self.features(board)?;
        let (logits, value_pre) = self.forward(&active);
        Ok(EvalResult {
            policy: softmax(&logits),
            value: value_pre.tanh(),
        })
    }

    fn action_size(&self) -> usize {
        self.params.action_size
    }
}

impl TrainableEvaluator for LinearEvaluator {
    fn train(&mut self, examples: &[TrainingExample]) -> Result<TrainingReport, EvaluatorError> {
        let mut report = TrainingReport {
            examples: examples.len(),
            epochs: self.config.epochs,
            ..Default::default()
        };
        if examples.is_empty() || self.config.epochs == 0 {
            return Ok(report);
        }

        let a_size = self.params.action_size;
        let f = self.params.num_features();
        let batch_size = self.config.batch_size.max(1);
        let lr = self.config.learning_rate;
        let decay = 1.0 - lr * self.config.weight_decay;

        for epoch in 0..self.config.epochs {
            let mut policy_loss = 0.0f64;
            let mut value_loss = 0.0f64;

            for batch in examples.chunks(batch_size) {
                let mut grad_policy = vec![0.0f32; a_size * f];
                let mut grad_value = vec![0.0f32; f];

                for ex in batch {
                    if ex.policy.len() != a_size {
                        return Err(EvaluatorError::Shape(format!(
                            "policy target has {} entries, expected {}",
                            ex.policy.len(),
                            a_size
                        )));
                    }
                    let active = self.features(&ex.board)?;
                    let (logits, value_pre) = self.forward(&active);
                    let probs = softmax(&logits);
                    let v = value_pre.tanh();

                    for (a, (&p, &target)) in probs.iter().zip(&ex.policy).enumerate() {
                        if target > 0.0 {
                            policy_loss -= (target * p.max(1e-12).ln()) as f64;
                        }
                        let g = p - target;
                        let row = &mut grad_policy[a * f..(a + 1) * f];
                        for &i in &active {
                            row[i] += g;
                        }
                    }

                    let err = v - ex.value;
                    value_loss += (err * err) as f64;
                    let g = 2.0 * err * (1.0 - v * v);
                    for &i in &active {
                        grad_value[i] += g;
                    }
                }

                let scale = lr / batch.len() as f32;
                for (w, g) in self.params.policy_weights.iter_mut().zip(&grad_policy) {
                    *w = *w * decay - scale * g;
                }
                for (w, g) in self.params.value_weights.iter_mut().zip(&grad_value) {
                    *w = *w * decay - scale * g;
                }
            }

            let n = examples.len() as f64;
            report.policy_loss = (policy_loss / n) as f32;
            report.value_loss = (value_loss / n) as f32;
            debug!(
                epoch,
                policy_loss = report.policy_loss,
                value_loss = report.value_loss,
                "Linear evaluator epoch"
            );
        }

        Ok(report)
    }

    fn save_snapshot(&self, path: &Path) -> Result<(), EvaluatorError> {
        write_json_atomic(path, &self.params)
    }

    fn load_snapshot(&mut self, path: &Path) -> Result<(), EvaluatorError> {
        let params: LinearParams = read_json(path)?;
        let features = params.num_features();
        if params.policy_weights.len() != params.action_size * features
            || params.value_weights.len() != features
        {
            return Err(EvaluatorError::Shape(format!(
                "snapshot {} has inconsistent weight lengths",
                path.display()
            )));
        }
        if params.board_size != self.params.board_size
            || params.action_size != self.params.action_size
        {
            return Err(EvaluatorError::Shape(format!(
                "snapshot {} is for board {} / {} actions, model is board {} / {} actions",
                path.display(),
                params.board_size,
                params.action_size,
                self.params.board_size,
                self.params.action_size
            )));
        }
        self.params = params;
        Ok(())
    }
}
