//! Centralized configuration loading from config.toml.
//!
//! This crate provides configuration structs and loading logic shared
//! across all Zeroplay components (coach, evaluate, play).
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Command-line flags (applied by each binary)
//! 2. Environment variables (`ZEROPLAY_<SECTION>_<KEY>`)
//! 3. config.toml file
//! 4. Built-in defaults (config.defaults.toml)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! ZEROPLAY_<SECTION>_<KEY>=value
//!
//! Examples:
//!     ZEROPLAY_COMMON_ENV_ID=territory
//!     ZEROPLAY_COMMON_BOARD_SIZE=7
//!     ZEROPLAY_COACH_ITERATIONS=50
//!     ZEROPLAY_MCTS_NUM_SIMULATIONS=100
//!     ZEROPLAY_EVALUATION_UPDATE_THRESHOLD=0.6
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{
    apply_env_overrides, load_config, load_from_path, try_load_from_path, ConfigError,
    CONFIG_SEARCH_PATHS,
};
pub use structs::*;
