//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",    // Current directory
    "../config.toml", // Parent directory (when running from subdirectory)
];

/// Errors reading an explicit configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by ZEROPLAY_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    if let Ok(path) = std::env::var("ZEROPLAY_CONFIG") {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from ZEROPLAY_CONFIG: {}", path.display());
            return load_from_path(&path);
        }
        warn!(
            "ZEROPLAY_CONFIG={} not found, searching defaults",
            path.display()
        );
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(&path);
        }
    }

    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path, falling back to defaults when the
/// file cannot be read or parsed.
pub fn load_from_path(path: &Path) -> CentralConfig {
    match try_load_from_path(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{}, using defaults", e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Load configuration from a specific path, reporting read and parse errors.
pub fn try_load_from_path(path: &Path) -> Result<CentralConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(apply_env_overrides(config))
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, f32, usize, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        match std::env::var($key).map(|s| s.parse()) {
            Ok(Ok(v)) => $config.$section.$field = v,
            Ok(Err(_)) => warn!(key = $key, "Ignoring unparseable environment override"),
            Err(_) => {}
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: ZEROPLAY_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.data_dir, "ZEROPLAY_COMMON_DATA_DIR");
    env_override!(config, common.env_id, "ZEROPLAY_COMMON_ENV_ID");
    env_override!(
        config,
        common.board_size,
        "ZEROPLAY_COMMON_BOARD_SIZE",
        parse
    );
    env_override!(config, common.log_level, "ZEROPLAY_COMMON_LOG_LEVEL");
    env_override!(config, common.seed, "ZEROPLAY_COMMON_SEED", parse);

    // Coach
    env_override!(
        config,
        coach.iterations,
        "ZEROPLAY_COACH_ITERATIONS",
        parse
    );
    env_override!(
        config,
        coach.episodes_per_iteration,
        "ZEROPLAY_COACH_EPISODES_PER_ITERATION",
        parse
    );
    env_override!(
        config,
        coach.temp_threshold,
        "ZEROPLAY_COACH_TEMP_THRESHOLD",
        parse
    );
    env_override!(
        config,
        coach.history_window,
        "ZEROPLAY_COACH_HISTORY_WINDOW",
        parse
    );
    env_override!(
        config,
        coach.max_examples_per_iteration,
        "ZEROPLAY_COACH_MAX_EXAMPLES_PER_ITERATION",
        parse
    );
    env_override!(
        config,
        coach.checkpoint_dir,
        "ZEROPLAY_COACH_CHECKPOINT_DIR"
    );
    env_override!(config, coach.workers, "ZEROPLAY_COACH_WORKERS", parse);

    // MCTS
    env_override!(
        config,
        mcts.num_simulations,
        "ZEROPLAY_MCTS_NUM_SIMULATIONS",
        parse
    );
    env_override!(config, mcts.c_puct, "ZEROPLAY_MCTS_C_PUCT", parse);

    // Evaluator
    env_override!(
        config,
        evaluator.learning_rate,
        "ZEROPLAY_EVALUATOR_LEARNING_RATE",
        parse
    );
    env_override!(
        config,
        evaluator.weight_decay,
        "ZEROPLAY_EVALUATOR_WEIGHT_DECAY",
        parse
    );
    env_override!(config, evaluator.epochs, "ZEROPLAY_EVALUATOR_EPOCHS", parse);
    env_override!(
        config,
        evaluator.batch_size,
        "ZEROPLAY_EVALUATOR_BATCH_SIZE",
        parse
    );

    // Evaluation
    env_override!(
        config,
        evaluation.arena_games,
        "ZEROPLAY_EVALUATION_ARENA_GAMES",
        parse
    );
    env_override!(
        config,
        evaluation.update_threshold,
        "ZEROPLAY_EVALUATION_UPDATE_THRESHOLD",
        parse
    );
    env_override!(config, evaluation.games, "ZEROPLAY_EVALUATION_GAMES", parse);
    env_override!(
        config,
        evaluation.temperature,
        "ZEROPLAY_EVALUATION_TEMPERATURE",
        parse
    );

    config
}
