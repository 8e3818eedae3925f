//! Coach - self-play training loop for Zeroplay
//!
//! Alternates four phases per iteration:
//! 1. Self-play episodes with the current evaluator behind MCTS
//! 2. Append the examples to a rolling, windowed training history
//! 3. Retrain a copy of the evaluator on the shuffled history
//! 4. Gate the retrained evaluator against the previous one in the arena
//!
//! Checkpoints, saved history and `coach_stats.json` live in one directory so
//! an interrupted run can be resumed.
//!
//! # Example
//!
//! ```no_run
//! use coach::{Coach, CoachSettings};
//! use engine_core::Game;
//! use mcts::{LinearConfig, LinearEvaluator};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let game = engine_games::create_game("othello", 6).unwrap();
//! let mut rng = ChaCha20Rng::seed_from_u64(0);
//! let evaluator = LinearEvaluator::new(6, game.action_size(), LinearConfig::default(), &mut rng);
//! let mut coach = Coach::new(game, evaluator, CoachSettings::default()).unwrap();
//! coach.run().unwrap();
//! ```

pub mod coach;
pub mod config;
pub mod episode;
pub mod eval_log;
pub mod error;
pub mod history;
pub mod stats;
pub mod storage;

use std::io::{BufRead, Write};
use std::path::Path;

pub use coach::{gate_decision, Coach, CoachSettings, GateDecision, IterationReport, Phase};
pub use config::Config;
pub use episode::{ply_limit, run_episode, Episode};
pub use eval_log::{append_row, EvaluationRow};
pub use error::CoachError;
pub use history::ExampleHistory;
pub use stats::{CoachStats, CoachStatsSnapshot, IterationRecord};
pub use storage::{CheckpointStore, ResumePoint};

/// Install the global fmt subscriber. `RUST_LOG` wins over `level`.
pub fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Ask whether to continue without the training history at `missing`.
/// Anything but `y`/`yes` (or end of input) declines.
pub fn confirm_missing_history<R: BufRead, W: Write>(
    missing: &Path,
    input: &mut R,
    output: &mut W,
) -> bool {
    let _ = write!(
        output,
        "Training history {} not found. Continue with an empty history? [y/N] ",
        missing.display()
    );
    let _ = output.flush();

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => false,
        Ok(_) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
    }
}
