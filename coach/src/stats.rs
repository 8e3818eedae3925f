//! Coach statistics tracking and persistence.
//!
//! Tracks self-play outcomes, training losses and gate decisions. Stats are
//! written to `coach_stats.json` after each iteration.

use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use engine_core::Outcome;
use mcts::{write_json_atomic, SearchStats, TrainingReport};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Per-iteration summary kept in the stats file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: u32,
    pub episodes: u32,
    pub examples: usize,
    pub history_examples: usize,
    pub policy_loss: Option<f32>,
    pub value_loss: Option<f32>,
    pub wins_new: Option<u32>,
    pub wins_prev: Option<u32>,
    pub draws: Option<u32>,
    pub promoted: Option<bool>,
}

/// Serializable stats for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachStatsSnapshot {
    pub env_id: String,
    pub iterations_completed: u32,
    pub promotions: u32,
    pub rejections: u32,
    pub episodes_completed: u64,
    pub total_plies: u64,
    pub black_wins: u64,
    pub white_wins: u64,
    pub draws: u64,
    pub avg_episode_length: f64,
    pub simulations: u64,
    pub evaluator_anomalies: u64,
    pub runtime_seconds: f64,
    pub iterations: Vec<IterationRecord>,
    pub timestamp: u64,
}

/// Aggregated coach statistics.
#[derive(Debug)]
pub struct CoachStats {
    env_id: String,
    stats_path: PathBuf,
    start_time: Instant,
    promotions: u32,
    rejections: u32,
    episodes_completed: u64,
    total_plies: u64,
    black_wins: u64,
    white_wins: u64,
    draws: u64,
    simulations: u64,
    evaluator_anomalies: u64,
    iterations: Vec<IterationRecord>,
}

impl CoachStats {
    pub fn new(stats_path: impl Into<PathBuf>, env_id: &str) -> Self {
        Self {
            env_id: env_id.to_string(),
            stats_path: stats_path.into(),
            start_time: Instant::now(),
            promotions: 0,
            rejections: 0,
            episodes_completed: 0,
            total_plies: 0,
            black_wins: 0,
            white_wins: 0,
            draws: 0,
            simulations: 0,
            evaluator_anomalies: 0,
            iterations: Vec::new(),
        }
    }

    /// Record a finished self-play episode; `outcome` is from Black's side.
    pub fn record_episode(&mut self, plies: u32, outcome: Outcome, search: &SearchStats) {
        self.episodes_completed += 1;
        self.total_plies += plies as u64;
        match outcome {
            Outcome::Win => self.black_wins += 1,
            Outcome::Loss => self.white_wins += 1,
            _ => self.draws += 1,
        }
        self.simulations += search.simulations;
        self.evaluator_anomalies += search.anomalies;
    }

    pub fn record_iteration(&mut self, record: IterationRecord) {
        match record.promoted {
            Some(true) => self.promotions += 1,
            Some(false) => self.rejections += 1,
            None => {}
        }
        self.iterations.push(record);
    }

    pub fn snapshot(&self) -> CoachStatsSnapshot {
        let avg_episode_length = if self.episodes_completed > 0 {
            self.total_plies as f64 / self.episodes_completed as f64
        } else {
            0.0
        };

        CoachStatsSnapshot {
            env_id: self.env_id.clone(),
            iterations_completed: self.iterations.len() as u32,
            promotions: self.promotions,
            rejections: self.rejections,
            episodes_completed: self.episodes_completed,
            total_plies: self.total_plies,
            black_wins: self.black_wins,
            white_wins: self.white_wins,
            draws: self.draws,
            avg_episode_length,
            simulations: self.simulations,
            evaluator_anomalies: self.evaluator_anomalies,
            runtime_seconds: self.start_time.elapsed().as_secs_f64(),
            iterations: self.iterations.clone(),
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Write stats to JSON. Failures are logged, not fatal.
    pub fn write_stats(&self) {
        match write_json_atomic(&self.stats_path, &self.snapshot()) {
            Ok(()) => debug!("Wrote coach stats to {}", self.stats_path.display()),
            Err(e) => warn!("Failed to write coach stats: {}", e),
        }
    }

    pub fn stats_path(&self) -> &Path {
        &self.stats_path
    }
}

impl IterationRecord {
    pub fn new(iteration: u32) -> Self {
        Self {
            iteration,
            episodes: 0,
            examples: 0,
            history_examples: 0,
            policy_loss: None,
            value_loss: None,
            wins_new: None,
            wins_prev: None,
            draws: None,
            promoted: None,
        }
    }

    pub fn with_training(mut self, report: &TrainingReport) -> Self {
        self.policy_loss = Some(report.policy_loss);
        self.value_loss = Some(report.value_loss);
        self
    }
}
