//! Default configuration values loaded from config.defaults.toml.
//!
//! The defaults file is embedded at compile time so every binary agrees on
//! the same values without shipping extra files.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    coach: CoachDefaults,
    mcts: MctsDefaults,
    evaluator: EvaluatorDefaults,
    evaluation: EvaluationDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    data_dir: String,
    env_id: String,
    board_size: usize,
    log_level: String,
    seed: u64,
}

#[derive(Debug, Deserialize)]
struct CoachDefaults {
    iterations: u32,
    episodes_per_iteration: u32,
    temp_threshold: u32,
    history_window: usize,
    max_examples_per_iteration: usize,
    checkpoint_dir: String,
    workers: usize,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    num_simulations: u32,
    c_puct: f32,
}

#[derive(Debug, Deserialize)]
struct EvaluatorDefaults {
    learning_rate: f32,
    weight_decay: f32,
    epochs: u32,
    batch_size: usize,
}

#[derive(Debug, Deserialize)]
struct EvaluationDefaults {
    arena_games: u32,
    update_threshold: f64,
    games: u32,
    temperature: f32,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn data_dir() -> &'static str {
    &DEFAULTS.common.data_dir
}
pub fn env_id() -> &'static str {
    &DEFAULTS.common.env_id
}
pub fn board_size() -> usize {
    DEFAULTS.common.board_size
}
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}
pub fn seed() -> u64 {
    DEFAULTS.common.seed
}

// Coach
pub fn iterations() -> u32 {
    DEFAULTS.coach.iterations
}
pub fn episodes_per_iteration() -> u32 {
    DEFAULTS.coach.episodes_per_iteration
}
pub fn temp_threshold() -> u32 {
    DEFAULTS.coach.temp_threshold
}
pub fn history_window() -> usize {
    DEFAULTS.coach.history_window
}
pub fn max_examples_per_iteration() -> usize {
    DEFAULTS.coach.max_examples_per_iteration
}
pub fn checkpoint_dir() -> &'static str {
    &DEFAULTS.coach.checkpoint_dir
}
pub fn workers() -> usize {
    DEFAULTS.coach.workers
}

// MCTS
pub fn num_simulations() -> u32 {
    DEFAULTS.mcts.num_simulations
}
pub fn c_puct() -> f32 {
    DEFAULTS.mcts.c_puct
}

// Evaluator
pub fn learning_rate() -> f32 {
    DEFAULTS.evaluator.learning_rate
}
pub fn weight_decay() -> f32 {
    DEFAULTS.evaluator.weight_decay
}
pub fn epochs() -> u32 {
    DEFAULTS.evaluator.epochs
}
pub fn batch_size() -> usize {
    DEFAULTS.evaluator.batch_size
}

// Evaluation
pub fn arena_games() -> u32 {
    DEFAULTS.evaluation.arena_games
}
pub fn update_threshold() -> f64 {
    DEFAULTS.evaluation.update_threshold
}
pub fn eval_games() -> u32 {
    DEFAULTS.evaluation.games
}
pub fn eval_temperature() -> f32 {
    DEFAULTS.evaluation.temperature
}
