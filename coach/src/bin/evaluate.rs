//! Evaluate - pit a trained checkpoint against a baseline opponent
//!
//! Plays a match in the arena (half the games with each side moving first)
//! and reports wins, losses and draws from the checkpoint's point of view.
//! With `--csv` the result is appended as one row to a CSV log.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use arena::{Arena, GreedyPlayer, GtpPlayer, MctsPlayer, RandomPlayer, Strategy};
use clap::{Parser, ValueEnum};
use coach::config::{validate_log_level, CENTRAL_CONFIG};
use coach::{append_row, init_tracing, EvaluationRow};
use engine_core::Game;
use engine_games::AnyGame;
use mcts::{LinearConfig, LinearEvaluator, MctsConfig, TrainableEvaluator};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Opponent {
    /// Uniformly random legal moves
    Random,
    /// One-ply score maximiser
    Greedy,
    /// The same checkpoint
    #[value(name = "self")]
    SelfPlay,
    /// Another checkpoint (--opponent-checkpoint)
    Checkpoint,
    /// External GTP engine (--gtp-program)
    Gtp,
}

impl Opponent {
    fn label(self) -> &'static str {
        match self {
            Opponent::Random => "random",
            Opponent::Greedy => "greedy",
            Opponent::SelfPlay => "self",
            Opponent::Checkpoint => "checkpoint",
            Opponent::Gtp => "gtp",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "evaluate")]
#[command(about = "Evaluate a Zeroplay checkpoint against a baseline opponent")]
struct Args {
    /// Game to evaluate (othello, territory)
    #[arg(long, default_value_t = CENTRAL_CONFIG.common.env_id.clone())]
    env_id: String,

    /// Board side length (0 for the game's default)
    #[arg(long, default_value_t = CENTRAL_CONFIG.common.board_size)]
    board_size: usize,

    /// Parameter file to evaluate (defaults to best.json in the checkpoint dir)
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Opponent kind
    #[arg(long, value_enum, default_value_t = Opponent::Random)]
    opponent: Opponent,

    /// Parameter file of the opponent when --opponent checkpoint
    #[arg(long)]
    opponent_checkpoint: Option<PathBuf>,

    /// GTP engine executable when --opponent gtp
    #[arg(long)]
    gtp_program: Option<String>,

    /// Arguments passed to the GTP engine
    #[arg(long, num_args = 1.., allow_hyphen_values = true)]
    gtp_args: Vec<String>,

    /// Number of games (odd counts are rounded down)
    #[arg(long, default_value_t = CENTRAL_CONFIG.evaluation.games)]
    games: u32,

    /// MCTS simulations per move
    #[arg(long, default_value_t = CENTRAL_CONFIG.mcts.num_simulations)]
    num_simulations: u32,

    /// PUCT exploration constant
    #[arg(long, default_value_t = CENTRAL_CONFIG.mcts.c_puct)]
    c_puct: f32,

    /// Move selection temperature (0 plays the most visited move)
    #[arg(long, default_value_t = CENTRAL_CONFIG.evaluation.temperature)]
    temperature: f32,

    /// Random seed
    #[arg(long, default_value_t = CENTRAL_CONFIG.common.seed)]
    seed: u64,

    /// Append the result to a CSV log
    #[arg(long)]
    csv: bool,

    /// CSV log location (defaults to evaluations.csv in the data dir)
    #[arg(long)]
    csv_path: Option<PathBuf>,

    /// Disable progress bars
    #[arg(long)]
    no_progress: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = CENTRAL_CONFIG.common.log_level.clone())]
    log_level: String,
}

impl Args {
    fn validate(&self) -> Result<()> {
        if !engine_games::is_available(&self.env_id) {
            return Err(anyhow!("unknown env_id '{}'", self.env_id));
        }
        if self.games < 2 {
            return Err(anyhow!("games must be at least 2"));
        }
        if !(self.temperature.is_finite() && self.temperature >= 0.0) {
            return Err(anyhow!("temperature must be non-negative"));
        }
        if !(self.c_puct.is_finite() && self.c_puct > 0.0) {
            return Err(anyhow!("c_puct must be positive"));
        }
        if self.opponent == Opponent::Checkpoint && self.opponent_checkpoint.is_none() {
            return Err(anyhow!("--opponent checkpoint requires --opponent-checkpoint"));
        }
        if self.opponent == Opponent::Gtp && self.gtp_program.is_none() {
            return Err(anyhow!("--opponent gtp requires --gtp-program"));
        }
        validate_log_level(&self.log_level)
    }

    fn checkpoint_path(&self) -> PathBuf {
        self.checkpoint.clone().unwrap_or_else(|| {
            Path::new(&CENTRAL_CONFIG.coach.checkpoint_dir).join(coach::storage::BEST_FILE)
        })
    }

    fn csv_path(&self) -> PathBuf {
        self.csv_path
            .clone()
            .unwrap_or_else(|| Path::new(&CENTRAL_CONFIG.common.data_dir).join("evaluations.csv"))
    }

    fn mcts_config(&self) -> MctsConfig {
        MctsConfig::for_evaluation()
            .with_simulations(self.num_simulations)
            .with_c_puct(self.c_puct)
    }
}

fn load_evaluator(
    game: &AnyGame,
    path: &Path,
    rng: &mut ChaCha20Rng,
) -> Result<LinearEvaluator> {
    let (board_size, _) = game.board_dimensions();
    let mut evaluator =
        LinearEvaluator::new(board_size, game.action_size(), LinearConfig::default(), rng);
    evaluator
        .load_snapshot(path)
        .with_context(|| format!("Failed to load checkpoint {}", path.display()))?;
    Ok(evaluator)
}

fn main() -> Result<()> {
    let args = Args::parse();
    args.validate()?;
    init_tracing(&args.log_level);

    let game = engine_games::create_game(&args.env_id, args.board_size)
        .with_context(|| format!("Failed to create game '{}'", args.env_id))?;
    let mut rng = ChaCha20Rng::seed_from_u64(args.seed);

    let checkpoint = args.checkpoint_path();
    let evaluator = load_evaluator(&game, &checkpoint, &mut rng)?;
    let opponent_evaluator = match (&args.opponent, &args.opponent_checkpoint) {
        (Opponent::Checkpoint, Some(path)) => Some(load_evaluator(&game, path, &mut rng)?),
        _ => None,
    };

    let config = args.mcts_config();
    let mut candidate = MctsPlayer::new(
        &game,
        &evaluator,
        config.clone(),
        ChaCha20Rng::seed_from_u64(rng.gen()),
    )
    .with_temperature(args.temperature);

    let mut opponent: Box<dyn Strategy + '_> = match args.opponent {
        Opponent::Random => Box::new(RandomPlayer::new(
            &game,
            ChaCha20Rng::seed_from_u64(rng.gen()),
        )),
        Opponent::Greedy => Box::new(GreedyPlayer::new(&game)),
        Opponent::SelfPlay => Box::new(
            MctsPlayer::new(
                &game,
                &evaluator,
                config,
                ChaCha20Rng::seed_from_u64(rng.gen()),
            )
            .with_temperature(args.temperature),
        ),
        Opponent::Checkpoint => {
            let other = opponent_evaluator
                .as_ref()
                .ok_or_else(|| anyhow!("opponent checkpoint not loaded"))?;
            Box::new(
                MctsPlayer::new(&game, other, config, ChaCha20Rng::seed_from_u64(rng.gen()))
                    .with_temperature(args.temperature),
            )
        }
        Opponent::Gtp => {
            let program = args
                .gtp_program
                .clone()
                .ok_or_else(|| anyhow!("--gtp-program is required"))?;
            let (board_size, _) = game.board_dimensions();
            Box::new(GtpPlayer::new(program, args.gtp_args.clone(), board_size))
        }
    };

    info!(
        env_id = %args.env_id,
        checkpoint = %checkpoint.display(),
        opponent = args.opponent.label(),
        games = args.games,
        simulations = args.num_simulations,
        "Starting evaluation"
    );

    let arena = Arena::new(&game).with_progress(!args.no_progress);
    let result = arena.play_match(&mut candidate, opponent.as_mut(), args.games)?;

    println!(
        "{} vs {}: {} wins, {} losses, {} draws ({:.1}% wins, {:.1}% draws)",
        checkpoint.display(),
        args.opponent.label(),
        result.wins_a,
        result.wins_b,
        result.draws,
        result.win_rate_a() * 100.0,
        result.draw_rate() * 100.0
    );

    if args.csv {
        let path = args.csv_path();
        let row = EvaluationRow::new(
            &args.env_id,
            &checkpoint,
            args.opponent.label(),
            args.num_simulations,
            args.temperature,
            &result,
        );
        append_row(&path, &row)?;
        info!(path = %path.display(), "Appended evaluation result");
    }
    Ok(())
}
