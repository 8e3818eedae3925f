//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_data_dir() -> String {
    defaults::data_dir().into()
}
fn d_env_id() -> String {
    defaults::env_id().into()
}
fn d_board_size() -> usize {
    defaults::board_size()
}
fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_seed() -> u64 {
    defaults::seed()
}
fn d_iterations() -> u32 {
    defaults::iterations()
}
fn d_episodes() -> u32 {
    defaults::episodes_per_iteration()
}
fn d_temp_threshold() -> u32 {
    defaults::temp_threshold()
}
fn d_history_window() -> usize {
    defaults::history_window()
}
fn d_max_examples() -> usize {
    defaults::max_examples_per_iteration()
}
fn d_checkpoint_dir() -> String {
    defaults::checkpoint_dir().into()
}
fn d_workers() -> usize {
    defaults::workers()
}
fn d_num_sims() -> u32 {
    defaults::num_simulations()
}
fn d_c_puct() -> f32 {
    defaults::c_puct()
}
fn d_lr() -> f32 {
    defaults::learning_rate()
}
fn d_weight_decay() -> f32 {
    defaults::weight_decay()
}
fn d_epochs() -> u32 {
    defaults::epochs()
}
fn d_batch_size() -> usize {
    defaults::batch_size()
}
fn d_arena_games() -> u32 {
    defaults::arena_games()
}
fn d_update_threshold() -> f64 {
    defaults::update_threshold()
}
fn d_eval_games() -> u32 {
    defaults::eval_games()
}
fn d_eval_temperature() -> f32 {
    defaults::eval_temperature()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub coach: CoachConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_data_dir")]
    pub data_dir: String,
    #[serde(default = "d_env_id")]
    pub env_id: String,
    /// Board side length; 0 means the game's default.
    #[serde(default = "d_board_size")]
    pub board_size: usize,
    #[serde(default = "d_log_level")]
    pub log_level: String,
    #[serde(default = "d_seed")]
    pub seed: u64,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir().into(),
            env_id: defaults::env_id().into(),
            board_size: defaults::board_size(),
            log_level: defaults::log_level().into(),
            seed: defaults::seed(),
        }
    }
}

/// Self-play training loop configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CoachConfig {
    #[serde(default = "d_iterations")]
    pub iterations: u32,
    #[serde(default = "d_episodes")]
    pub episodes_per_iteration: u32,
    #[serde(default = "d_temp_threshold")]
    pub temp_threshold: u32,
    #[serde(default = "d_history_window")]
    pub history_window: usize,
    #[serde(default = "d_max_examples")]
    pub max_examples_per_iteration: usize,
    #[serde(default = "d_checkpoint_dir")]
    pub checkpoint_dir: String,
    #[serde(default = "d_workers")]
    pub workers: usize,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            iterations: defaults::iterations(),
            episodes_per_iteration: defaults::episodes_per_iteration(),
            temp_threshold: defaults::temp_threshold(),
            history_window: defaults::history_window(),
            max_examples_per_iteration: defaults::max_examples_per_iteration(),
            checkpoint_dir: defaults::checkpoint_dir().into(),
            workers: defaults::workers(),
        }
    }
}

/// MCTS (Monte Carlo Tree Search) configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsConfig {
    #[serde(default = "d_num_sims")]
    pub num_simulations: u32,
    #[serde(default = "d_c_puct")]
    pub c_puct: f32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: defaults::num_simulations(),
            c_puct: defaults::c_puct(),
        }
    }
}

/// Trainable evaluator hyper-parameters
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EvaluatorConfig {
    #[serde(default = "d_lr")]
    pub learning_rate: f32,
    #[serde(default = "d_weight_decay")]
    pub weight_decay: f32,
    #[serde(default = "d_epochs")]
    pub epochs: u32,
    #[serde(default = "d_batch_size")]
    pub batch_size: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            learning_rate: defaults::learning_rate(),
            weight_decay: defaults::weight_decay(),
            epochs: defaults::epochs(),
            batch_size: defaults::batch_size(),
        }
    }
}

/// Gating and evaluation configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Games played between the new and previous parameters when gating.
    #[serde(default = "d_arena_games")]
    pub arena_games: u32,
    /// Minimum share of decisive games the new parameters must win.
    #[serde(default = "d_update_threshold")]
    pub update_threshold: f64,
    /// Games played by the standalone evaluate binary.
    #[serde(default = "d_eval_games")]
    pub games: u32,
    #[serde(default = "d_eval_temperature")]
    pub temperature: f32,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            arena_games: defaults::arena_games(),
            update_threshold: defaults::update_threshold(),
            games: defaults::eval_games(),
            temperature: defaults::eval_temperature(),
        }
    }
}
