//! Self-play training loop.
//!
//! Each iteration moves through four phases:
//!
//! 1. **SelfPlay**: play `episodes_per_iteration` games with the current
//!    parameters, in parallel on a rayon pool
//! 2. **BufferUpdate**: append the batch to the rolling history and save it
//! 3. **Retrain**: snapshot the current parameters, then train on the
//!    shuffled history
//! 4. **Gate**: pit the new parameters against the snapshot; keep them only
//!    if they win enough of the decisive games
//!
//! Cancellation is checked between episodes and between iterations. An
//! interrupted iteration never trains, gates or promotes.

use std::fmt;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arena::{Arena, MatchResult, MctsPlayer};
use engine_core::Game;
use indicatif::{ProgressBar, ProgressStyle};
use mcts::{MctsConfig, TrainableEvaluator, TrainingExample, TrainingReport};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::episode::{run_episode, Episode};
use crate::error::CoachError;
use crate::history::{cap_batch, ExampleHistory};
use crate::stats::{CoachStats, IterationRecord};
use crate::storage::{CheckpointStore, ResumePoint};

/// Knobs of the training loop.
#[derive(Debug, Clone)]
pub struct CoachSettings {
    pub iterations: u32,
    pub episodes_per_iteration: u32,
    /// Last 1-based ply played at temperature 1.
    pub temp_threshold: u32,
    /// Iteration batches kept for training.
    pub history_window: usize,
    pub max_examples_per_iteration: usize,
    pub arena_games: u32,
    pub update_threshold: f64,
    pub mcts: MctsConfig,
    /// Rayon worker threads; 0 uses rayon's default.
    pub workers: usize,
    pub seed: u64,
    pub checkpoint_dir: PathBuf,
    pub show_progress: bool,
}

impl Default for CoachSettings {
    fn default() -> Self {
        Self {
            iterations: 24,
            episodes_per_iteration: 80,
            temp_threshold: 15,
            history_window: 20,
            max_examples_per_iteration: 200_000,
            arena_games: 30,
            update_threshold: 0.55,
            mcts: MctsConfig::for_training(),
            workers: 0,
            seed: 42,
            checkpoint_dir: PathBuf::from("./data/checkpoints"),
            show_progress: false,
        }
    }
}

/// Phase of an iteration, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    SelfPlay,
    BufferUpdate,
    Retrain,
    Gate,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::SelfPlay => "self-play",
            Phase::BufferUpdate => "buffer-update",
            Phase::Retrain => "retrain",
            Phase::Gate => "gate",
        };
        f.write_str(name)
    }
}

/// Outcome of gating new parameters against the previous ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Promote,
    Discard,
}

/// Decide whether new parameters (`result.wins_a`) replace the previous ones
/// (`result.wins_b`). Draws do not count; with no decisive game the new
/// parameters are discarded.
pub fn gate_decision(result: &MatchResult, threshold: f64) -> GateDecision {
    let decisive = result.decisive();
    if decisive == 0 || (result.wins_a as f64 / decisive as f64) < threshold {
        GateDecision::Discard
    } else {
        GateDecision::Promote
    }
}

/// What one iteration did.
#[derive(Debug, Clone)]
pub struct IterationReport {
    pub iteration: u32,
    pub episodes: u32,
    pub examples: usize,
    pub history_examples: usize,
    pub training: TrainingReport,
    pub gate: MatchResult,
    pub decision: GateDecision,
}

/// Drives self-play, retraining and gating for one game.
pub struct Coach<G: Game, E: TrainableEvaluator> {
    game: G,
    evaluator: E,
    settings: CoachSettings,
    history: ExampleHistory,
    store: CheckpointStore,
    stats: CoachStats,
    rng: ChaCha20Rng,
    pool: rayon::ThreadPool,
    shutdown: Arc<AtomicBool>,
    start_iteration: u32,
    skip_self_play_once: bool,
}

impl<G: Game, E: TrainableEvaluator> Coach<G, E> {
    pub fn new(game: G, evaluator: E, settings: CoachSettings) -> Result<Self, CoachError> {
        let store = CheckpointStore::open(&settings.checkpoint_dir)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.workers)
            .build()
            .map_err(|e| CoachError::WorkerPool(e.to_string()))?;
        let stats = CoachStats::new(store.stats_path(), game.env_id());
        info!(
            env_id = game.env_id(),
            iterations = settings.iterations,
            episodes = settings.episodes_per_iteration,
            simulations = settings.mcts.num_simulations,
            workers = pool.current_num_threads(),
            checkpoint_dir = %store.dir().display(),
            "Coach initialized"
        );
        Ok(Self {
            history: ExampleHistory::new(settings.history_window),
            rng: ChaCha20Rng::seed_from_u64(settings.seed),
            game,
            evaluator,
            settings,
            store,
            stats,
            pool,
            shutdown: Arc::new(AtomicBool::new(false)),
            start_iteration: 1,
            skip_self_play_once: false,
        })
    }

    /// Share an externally owned cancellation flag.
    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn history(&self) -> &ExampleHistory {
        &self.history
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    pub fn stats(&self) -> &CoachStats {
        &self.stats
    }

    pub fn start_iteration(&self) -> u32 {
        self.start_iteration
    }

    fn cancelled(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Load parameters and their saved history, then skip self-play for the
    /// first iteration run.
    ///
    /// A missing history file is only tolerated when `confirm` agrees to
    /// continue with an empty history.
    pub fn resume_from(
        &mut self,
        model: &Path,
        examples: &Path,
        start_iteration: u32,
        confirm: &mut dyn FnMut(&Path) -> bool,
    ) -> Result<(), CoachError> {
        self.evaluator.load_snapshot(model)?;
        info!(model = %model.display(), "Loaded parameters");

        if examples.exists() {
            self.history = ExampleHistory::load(examples, self.settings.history_window)?;
            self.skip_self_play_once = true;
            info!(
                examples = %examples.display(),
                batches = self.history.len(),
                total = self.history.total_examples(),
                "Loaded training history, skipping first self-play"
            );
        } else {
            warn!(examples = %examples.display(), "Training history not found");
            if !confirm(examples) {
                return Err(CoachError::PersistenceMissing(examples.to_path_buf()));
            }
            info!("Continuing with empty training history");
        }
        self.start_iteration = start_iteration.max(1);
        Ok(())
    }

    /// Resume from whatever the checkpoint directory holds. Returns `false`
    /// when there is nothing to resume.
    pub fn auto_resume(
        &mut self,
        confirm: &mut dyn FnMut(&Path) -> bool,
    ) -> Result<bool, CoachError> {
        let Some(ResumePoint {
            model,
            examples,
            iteration,
        }) = self.store.resume_point()?
        else {
            info!(dir = %self.store.dir().display(), "No checkpoint to resume from");
            return Ok(false);
        };
        self.resume_from(&model, &examples, iteration, confirm)?;
        Ok(true)
    }

    /// Run the remaining iterations. Stops early, without error, when the
    /// shutdown flag is raised.
    pub fn run(&mut self) -> Result<Vec<IterationReport>, CoachError> {
        let mut reports = Vec::new();
        for iteration in self.start_iteration..=self.settings.iterations {
            if self.cancelled() {
                info!(iteration, "Shutdown requested, stopping before iteration");
                break;
            }
            match self.run_iteration(iteration) {
                Ok(report) => reports.push(report),
                Err(CoachError::Cancelled) => {
                    info!(iteration, "Shutdown requested, iteration abandoned");
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        info!(completed = reports.len(), "Coach finished");
        Ok(reports)
    }

    /// Run one full iteration.
    pub fn run_iteration(&mut self, iteration: u32) -> Result<IterationReport, CoachError> {
        info!(iteration, total = self.settings.iterations, "Starting iteration");
        let mut record = IterationRecord::new(iteration);

        // SelfPlay
        let (episodes, examples) = if std::mem::take(&mut self.skip_self_play_once) {
            info!(iteration, phase = %Phase::SelfPlay, "Skipped after resume");
            (0, None)
        } else {
            let batch = self.self_play(iteration)?;
            (self.settings.episodes_per_iteration, Some(batch))
        };

        // BufferUpdate
        let batch_len = examples.as_ref().map_or(0, Vec::len);
        if let Some(batch) = examples {
            self.history.push(batch);
        }
        let examples_path = self.store.examples_path(iteration - 1);
        self.history.save(&examples_path)?;
        info!(
            iteration,
            phase = %Phase::BufferUpdate,
            batches = self.history.len(),
            total = self.history.total_examples(),
            path = %examples_path.display(),
            "Training history saved"
        );

        // Retrain
        let temp_path = self.store.temp_path();
        self.evaluator.save_snapshot(&temp_path)?;
        let previous = self.evaluator.clone();
        let training_set = self.history.shuffled(&mut self.rng);
        let training = self.evaluator.train(&training_set)?;
        info!(
            iteration,
            phase = %Phase::Retrain,
            examples = training.examples,
            policy_loss = training.policy_loss,
            value_loss = training.value_loss,
            "Training complete"
        );

        // Gate
        let gate = self.gate(&previous)?;
        let decision = gate_decision(&gate, self.settings.update_threshold);
        match decision {
            GateDecision::Promote => {
                self.evaluator
                    .save_snapshot(&self.store.checkpoint_path(iteration))?;
                self.evaluator.save_snapshot(&self.store.best_path())?;
                info!(
                    iteration,
                    phase = %Phase::Gate,
                    wins_new = gate.wins_a,
                    wins_prev = gate.wins_b,
                    draws = gate.draws,
                    "Accepting new parameters"
                );
            }
            GateDecision::Discard => {
                self.evaluator.load_snapshot(&temp_path)?;
                info!(
                    iteration,
                    phase = %Phase::Gate,
                    wins_new = gate.wins_a,
                    wins_prev = gate.wins_b,
                    draws = gate.draws,
                    "Rejecting new parameters"
                );
            }
        }

        record.episodes = episodes;
        record.examples = batch_len;
        record.history_examples = self.history.total_examples();
        record.wins_new = Some(gate.wins_a);
        record.wins_prev = Some(gate.wins_b);
        record.draws = Some(gate.draws);
        record.promoted = Some(decision == GateDecision::Promote);
        self.stats.record_iteration(record.with_training(&training));
        self.stats.write_stats();

        Ok(IterationReport {
            iteration,
            episodes,
            examples: batch_len,
            history_examples: self.history.total_examples(),
            training,
            gate,
            decision,
        })
    }

    /// Play the iteration's episodes. Results come back in episode order
    /// regardless of scheduling.
    fn self_play(&mut self, iteration: u32) -> Result<Vec<TrainingExample>, CoachError> {
        let n = self.settings.episodes_per_iteration;
        let seeds: Vec<u64> = (0..n).map(|_| self.rng.gen()).collect();
        let progress = self.progress_bar(n as u64, "episodes");

        let game = &self.game;
        let evaluator = &self.evaluator;
        let config = &self.settings.mcts;
        let temp_threshold = self.settings.temp_threshold;
        let shutdown = &self.shutdown;

        let results: Vec<Option<Result<Episode, CoachError>>> = self.pool.install(|| {
            seeds
                .into_par_iter()
                .map(|seed| {
                    if shutdown.load(Ordering::Relaxed) {
                        return None;
                    }
                    let episode = run_episode(game, evaluator, config, temp_threshold, seed);
                    if let Some(pb) = &progress {
                        pb.inc(1);
                    }
                    Some(episode)
                })
                .collect()
        });
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        if self.cancelled() {
            return Err(CoachError::Cancelled);
        }

        let mut batch = Vec::new();
        for result in results {
            let Some(episode) = result else {
                return Err(CoachError::Cancelled);
            };
            let episode = episode?;
            self.stats
                .record_episode(episode.plies, episode.outcome, &episode.search);
            batch.extend(episode.examples);
        }

        let collected = batch.len();
        let batch = cap_batch(batch, self.settings.max_examples_per_iteration);
        info!(
            iteration,
            phase = %Phase::SelfPlay,
            episodes = n,
            examples = batch.len(),
            dropped = collected - batch.len(),
            "Self-play complete"
        );
        Ok(batch)
    }

    /// Greedy search over the new parameters (`a`) against `previous` (`b`).
    fn gate(&mut self, previous: &E) -> Result<MatchResult, CoachError> {
        let config = self.settings.mcts.clone();
        let mut new_player = MctsPlayer::new(
            &self.game,
            &self.evaluator,
            config.clone(),
            ChaCha20Rng::seed_from_u64(self.rng.gen()),
        );
        let mut prev_player = MctsPlayer::new(
            &self.game,
            previous,
            config,
            ChaCha20Rng::seed_from_u64(self.rng.gen()),
        );
        let arena = Arena::new(&self.game).with_progress(self.settings.show_progress);
        let result =
            arena.play_match(&mut new_player, &mut prev_player, self.settings.arena_games)?;
        debug!(
            new_simulations = new_player.stats().simulations,
            prev_simulations = prev_player.stats().simulations,
            "Gate search totals"
        );
        Ok(result)
    }

    fn progress_bar(&self, len: u64, unit: &str) -> Option<ProgressBar> {
        if !self.settings.show_progress || len == 0 || !std::io::stderr().is_terminal() {
            return None;
        }
        let pb = ProgressBar::new(len);
        let template =
            format!("{{spinner:.green}} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {unit} ({{eta}})");
        if let Ok(style) = ProgressStyle::default_bar().template(&template) {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    }
}
