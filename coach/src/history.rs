//! Rolling window of per-iteration training batches.

use std::collections::VecDeque;
use std::path::Path;

use mcts::{read_json, write_json_atomic, EvaluatorError, TrainingExample};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Examples from the most recent `window` iterations, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleHistory {
    window: usize,
    batches: VecDeque<Vec<TrainingExample>>,
}

impl ExampleHistory {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            batches: VecDeque::new(),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Number of iteration batches held.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn total_examples(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    pub fn batches(&self) -> impl Iterator<Item = &[TrainingExample]> {
        self.batches.iter().map(Vec::as_slice)
    }

    /// Append an iteration batch, evicting the oldest batches beyond the window.
    pub fn push(&mut self, batch: Vec<TrainingExample>) {
        self.batches.push_back(batch);
        self.trim();
    }

    fn trim(&mut self) {
        while self.batches.len() > self.window {
            if let Some(evicted) = self.batches.pop_front() {
                info!(
                    evicted = evicted.len(),
                    window = self.window,
                    "Dropped oldest training batch"
                );
            }
        }
    }

    /// All examples in one shuffled vector.
    pub fn shuffled(&self, rng: &mut ChaCha20Rng) -> Vec<TrainingExample> {
        let mut examples: Vec<TrainingExample> = self.batches.iter().flatten().cloned().collect();
        examples.shuffle(rng);
        examples
    }

    pub fn save(&self, path: &Path) -> Result<(), EvaluatorError> {
        write_json_atomic(path, self)?;
        debug!(
            path = %path.display(),
            batches = self.len(),
            examples = self.total_examples(),
            "Saved training history"
        );
        Ok(())
    }

    /// Load a saved history, applying `window` to it.
    pub fn load(path: &Path, window: usize) -> Result<Self, EvaluatorError> {
        let mut history: ExampleHistory = read_json(path)?;
        history.window = window.max(1);
        history.trim();
        Ok(history)
    }
}

/// Keep only the newest `max` examples of an iteration batch.
pub fn cap_batch(mut batch: Vec<TrainingExample>, max: usize) -> Vec<TrainingExample> {
    if batch.len() > max {
        batch.drain(..batch.len() - max);
    }
    batch
}
