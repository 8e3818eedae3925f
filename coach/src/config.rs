//! Configuration for the coach service
//!
//! Configuration is loaded from config.toml with environment variable overrides.
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use engine_config::{load_config, CentralConfig};
use mcts::{LinearConfig, MctsConfig};
use once_cell::sync::Lazy;
use tracing::level_filters::LevelFilter;

use crate::coach::CoachSettings;

/// Central config, loaded once at startup.
pub static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

fn default_env_id() -> String {
    CENTRAL_CONFIG.common.env_id.clone()
}

fn default_board_size() -> usize {
    CENTRAL_CONFIG.common.board_size
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_seed() -> u64 {
    CENTRAL_CONFIG.common.seed
}

fn default_iterations() -> u32 {
    CENTRAL_CONFIG.coach.iterations
}

fn default_episodes() -> u32 {
    CENTRAL_CONFIG.coach.episodes_per_iteration
}

fn default_temp_threshold() -> u32 {
    CENTRAL_CONFIG.coach.temp_threshold
}

fn default_history_window() -> usize {
    CENTRAL_CONFIG.coach.history_window
}

fn default_max_examples() -> usize {
    CENTRAL_CONFIG.coach.max_examples_per_iteration
}

fn default_checkpoint_dir() -> String {
    CENTRAL_CONFIG.coach.checkpoint_dir.clone()
}

fn default_workers() -> usize {
    CENTRAL_CONFIG.coach.workers
}

fn default_num_simulations() -> u32 {
    CENTRAL_CONFIG.mcts.num_simulations
}

fn default_c_puct() -> f32 {
    CENTRAL_CONFIG.mcts.c_puct
}

fn default_learning_rate() -> f32 {
    CENTRAL_CONFIG.evaluator.learning_rate
}

fn default_weight_decay() -> f32 {
    CENTRAL_CONFIG.evaluator.weight_decay
}

fn default_epochs() -> u32 {
    CENTRAL_CONFIG.evaluator.epochs
}

fn default_batch_size() -> usize {
    CENTRAL_CONFIG.evaluator.batch_size
}

fn default_arena_games() -> u32 {
    CENTRAL_CONFIG.evaluation.arena_games
}

fn default_update_threshold() -> f64 {
    CENTRAL_CONFIG.evaluation.update_threshold
}

/// Check a log level string the way `EnvFilter` will read it.
pub fn validate_log_level(level: &str) -> Result<()> {
    if level.parse::<LevelFilter>().is_err() {
        return Err(anyhow!(
            "invalid log level '{}', expected one of trace, debug, info, warn, error",
            level
        ));
    }
    Ok(())
}

#[derive(Parser, Debug, Clone)]
#[command(name = "coach")]
#[command(about = "Zeroplay Coach - self-play training loop")]
#[command(
    long_about = "Coach that alternates self-play, retraining and gating for one game,
writing checkpoints, training history and statistics to the checkpoint directory.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Game to train (othello, territory)
    #[arg(long, default_value_t = default_env_id())]
    pub env_id: String,

    /// Board side length (0 for the game's default)
    #[arg(long, default_value_t = default_board_size())]
    pub board_size: usize,

    /// Number of training iterations
    #[arg(long, default_value_t = default_iterations())]
    pub iterations: u32,

    /// Self-play episodes per iteration
    #[arg(long, default_value_t = default_episodes())]
    pub episodes: u32,

    /// Last ply (1-based) sampled at temperature 1; later plies are greedy
    #[arg(long, default_value_t = default_temp_threshold())]
    pub temp_threshold: u32,

    /// Iterations of examples kept for training
    #[arg(long, default_value_t = default_history_window())]
    pub history_window: usize,

    /// Cap on examples kept from one iteration (newest kept)
    #[arg(long, default_value_t = default_max_examples())]
    pub max_examples: usize,

    /// MCTS simulations per move
    #[arg(long, default_value_t = default_num_simulations())]
    pub num_simulations: u32,

    /// PUCT exploration constant
    #[arg(long, default_value_t = default_c_puct())]
    pub c_puct: f32,

    /// Evaluator learning rate
    #[arg(long, default_value_t = default_learning_rate())]
    pub learning_rate: f32,

    /// Evaluator L2 weight decay
    #[arg(long, default_value_t = default_weight_decay())]
    pub weight_decay: f32,

    /// Training epochs per iteration
    #[arg(long, default_value_t = default_epochs())]
    pub epochs: u32,

    /// Training minibatch size
    #[arg(long, default_value_t = default_batch_size())]
    pub batch_size: usize,

    /// Games played when gating new parameters
    #[arg(long, default_value_t = default_arena_games())]
    pub arena_games: u32,

    /// Share of decisive gate games needed to accept new parameters
    #[arg(long, default_value_t = default_update_threshold())]
    pub update_threshold: f64,

    /// Self-play worker threads (0 for one per core)
    #[arg(long, default_value_t = default_workers())]
    pub workers: usize,

    /// Seed for every random choice of the run
    #[arg(long, default_value_t = default_seed())]
    pub seed: u64,

    /// Directory for checkpoints, history and stats
    #[arg(long, default_value_t = default_checkpoint_dir())]
    pub checkpoint_dir: String,

    /// Resume from a parameter file (its history is read from `<file>.examples`)
    #[arg(long)]
    pub load_model: Option<PathBuf>,

    /// Iteration to start from when resuming with --load-model
    #[arg(long, default_value_t = 1)]
    pub start_iteration: u32,

    /// Resume from the newest state found in the checkpoint directory
    #[arg(long)]
    pub resume: bool,

    /// Continue without prompting when saved history is missing
    #[arg(long)]
    pub assume_yes: bool,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !engine_games::is_available(&self.env_id) {
            return Err(anyhow!(
                "unknown env_id '{}', expected one of {:?}",
                self.env_id,
                engine_games::AVAILABLE_GAMES
            ));
        }

        if self.iterations == 0 {
            return Err(anyhow!("iterations must be greater than 0"));
        }

        if self.episodes == 0 {
            return Err(anyhow!("episodes must be greater than 0"));
        }

        if self.history_window == 0 {
            return Err(anyhow!("history_window must be greater than 0"));
        }

        if self.max_examples == 0 {
            return Err(anyhow!("max_examples must be greater than 0"));
        }

        if self.arena_games < 2 {
            return Err(anyhow!("arena_games must be at least 2"));
        }

        if !(0.0..=1.0).contains(&self.update_threshold) {
            return Err(anyhow!(
                "update_threshold must be within [0, 1], got {}",
                self.update_threshold
            ));
        }

        if !(self.c_puct.is_finite() && self.c_puct > 0.0) {
            return Err(anyhow!("c_puct must be positive, got {}", self.c_puct));
        }

        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(anyhow!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }

        if self.batch_size == 0 {
            return Err(anyhow!("batch_size must be greater than 0"));
        }

        if self.checkpoint_dir.is_empty() {
            return Err(anyhow!("checkpoint_dir cannot be empty"));
        }

        if self.resume && self.load_model.is_some() {
            return Err(anyhow!("--resume and --load-model are mutually exclusive"));
        }

        validate_log_level(&self.log_level)
    }

    pub fn mcts_config(&self) -> MctsConfig {
        MctsConfig::for_training()
            .with_simulations(self.num_simulations)
            .with_c_puct(self.c_puct)
    }

    pub fn linear_config(&self) -> LinearConfig {
        LinearConfig {
            learning_rate: self.learning_rate,
            weight_decay: self.weight_decay,
            epochs: self.epochs,
            batch_size: self.batch_size,
        }
    }

    pub fn settings(&self) -> CoachSettings {
        CoachSettings {
            iterations: self.iterations,
            episodes_per_iteration: self.episodes,
            temp_threshold: self.temp_threshold,
            history_window: self.history_window,
            max_examples_per_iteration: self.max_examples,
            arena_games: self.arena_games,
            update_threshold: self.update_threshold,
            mcts: self.mcts_config(),
            workers: self.workers,
            seed: self.seed,
            checkpoint_dir: PathBuf::from(&self.checkpoint_dir),
            show_progress: !self.no_progress,
        }
    }
}
