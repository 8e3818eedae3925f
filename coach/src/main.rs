//! Coach - self-play training loop for Zeroplay
//!
//! A long-running process that:
//! 1. Optionally resumes from the checkpoint directory
//! 2. Runs self-play, retraining and gating for the configured iterations
//! 3. Writes checkpoints, training history and `coach_stats.json`
//!
//! Ctrl-C stops the run between episodes without promoting anything.

use std::io::{self, IsTerminal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use coach::{confirm_missing_history, init_tracing, Coach, Config, GateDecision};
use engine_core::Game;
use mcts::LinearEvaluator;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    init_tracing(&config.log_level);
    info!(log_level = %config.log_level, "Tracing initialized");

    let game = engine_games::create_game(&config.env_id, config.board_size)
        .with_context(|| format!("Failed to create game '{}'", config.env_id))?;
    let (board_size, _) = game.board_dimensions();
    info!(
        env_id = %config.env_id,
        board_size,
        action_size = game.action_size(),
        "Starting coach"
    );

    let mut init_rng = ChaCha20Rng::seed_from_u64(config.seed);
    let evaluator = LinearEvaluator::new(
        board_size,
        game.action_size(),
        config.linear_config(),
        &mut init_rng,
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let mut coach =
        Coach::new(game, evaluator, config.settings())?.with_shutdown(Arc::clone(&shutdown));

    let assume_yes = config.assume_yes;
    let mut confirm = |missing: &std::path::Path| {
        if assume_yes {
            warn!(path = %missing.display(), "Continuing without training history");
            return true;
        }
        if !io::stdin().is_terminal() {
            return false;
        }
        confirm_missing_history(missing, &mut io::stdin().lock(), &mut io::stderr())
    };

    if let Some(model) = &config.load_model {
        let examples = coach::storage::examples_path_for(model);
        coach.resume_from(model, &examples, config.start_iteration, &mut confirm)?;
    } else if config.resume && !coach.auto_resume(&mut confirm)? {
        info!("Starting fresh");
    }

    // Setup graceful shutdown
    let shutdown_flag = Arc::clone(&shutdown);
    let shutdown_handle = tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received, stopping after current episode...");
                shutdown_flag.store(true, Ordering::Relaxed);
            }
            Err(e) => error!("Failed to listen for ctrl+c: {}", e),
        }
    });

    let run_result = tokio::task::spawn_blocking(move || coach.run())
        .await
        .context("Coach task panicked")?;

    shutdown_handle.abort();

    match run_result {
        Ok(reports) => {
            let promoted = reports
                .iter()
                .filter(|r| r.decision == GateDecision::Promote)
                .count();
            info!(
                iterations = reports.len(),
                promoted,
                interrupted = shutdown.load(Ordering::Relaxed),
                "Coach completed successfully"
            );
            Ok(())
        }
        Err(e) => {
            error!("Coach failed: {}", e);
            Err(e.into())
        }
    }
}
