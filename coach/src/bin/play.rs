//! Play - interactive console game against a Zeroplay strategy
//!
//! Moves are entered as `row col` (0-based) or `pass`. The board is shown
//! from the human's side before every move, with the human's stones as `O`.

use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use arena::{Arena, GreedyPlayer, HumanPlayer, MctsPlayer, RandomPlayer, Strategy};
use clap::{Parser, ValueEnum};
use coach::config::{validate_log_level, CENTRAL_CONFIG};
use coach::init_tracing;
use engine_core::{Game, Outcome, Player};
use mcts::{LinearConfig, LinearEvaluator, MctsConfig, TrainableEvaluator};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Engine {
    /// MCTS backed by a checkpoint
    Mcts,
    /// One-ply score maximiser
    Greedy,
    /// Uniformly random legal moves
    Random,
}

#[derive(Parser, Debug)]
#[command(name = "play")]
#[command(about = "Play a game against a Zeroplay strategy in the console")]
struct Args {
    /// Game to play (othello, territory)
    #[arg(long, default_value_t = CENTRAL_CONFIG.common.env_id.clone())]
    env_id: String,

    /// Board side length (0 for the game's default)
    #[arg(long, default_value_t = CENTRAL_CONFIG.common.board_size)]
    board_size: usize,

    /// Opponent strategy
    #[arg(long, value_enum, default_value_t = Engine::Mcts)]
    engine: Engine,

    /// Parameter file for --engine mcts (defaults to best.json in the checkpoint dir)
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// MCTS simulations per move
    #[arg(long, default_value_t = CENTRAL_CONFIG.mcts.num_simulations)]
    num_simulations: u32,

    /// PUCT exploration constant
    #[arg(long, default_value_t = CENTRAL_CONFIG.mcts.c_puct)]
    c_puct: f32,

    /// Let the engine move first
    #[arg(long)]
    second: bool,

    /// Random seed
    #[arg(long, default_value_t = CENTRAL_CONFIG.common.seed)]
    seed: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if !engine_games::is_available(&args.env_id) {
        return Err(anyhow!("unknown env_id '{}'", args.env_id));
    }
    validate_log_level(&args.log_level)?;
    init_tracing(&args.log_level);

    let game = engine_games::create_game(&args.env_id, args.board_size)
        .with_context(|| format!("Failed to create game '{}'", args.env_id))?;
    let mut rng = ChaCha20Rng::seed_from_u64(args.seed);

    let evaluator = match args.engine {
        Engine::Mcts => {
            let path = args.checkpoint.clone().unwrap_or_else(|| {
                PathBuf::from(&CENTRAL_CONFIG.coach.checkpoint_dir).join(coach::storage::BEST_FILE)
            });
            let (board_size, _) = game.board_dimensions();
            let mut evaluator = LinearEvaluator::new(
                board_size,
                game.action_size(),
                LinearConfig::default(),
                &mut rng,
            );
            evaluator
                .load_snapshot(&path)
                .with_context(|| format!("Failed to load checkpoint {}", path.display()))?;
            Some(evaluator)
        }
        _ => None,
    };

    let mut engine: Box<dyn Strategy + '_> = match (&args.engine, &evaluator) {
        (Engine::Mcts, Some(evaluator)) => Box::new(MctsPlayer::new(
            &game,
            evaluator,
            MctsConfig::for_evaluation()
                .with_simulations(args.num_simulations)
                .with_c_puct(args.c_puct),
            ChaCha20Rng::seed_from_u64(rng.gen()),
        )),
        (Engine::Greedy, _) => Box::new(GreedyPlayer::new(&game)),
        _ => Box::new(RandomPlayer::new(&game, ChaCha20Rng::seed_from_u64(rng.gen()))),
    };
    let mut human = HumanPlayer::new(&game, BufReader::new(io::stdin()), io::stdout());

    let arena = Arena::new(&game);
    let result = if args.second {
        arena.play_game(engine.as_mut(), &mut human)?
    } else {
        arena.play_game(&mut human, engine.as_mut())?
    };

    let human_outcome = if args.second {
        result.outcome.flipped()
    } else {
        result.outcome
    };
    let (rows, _) = game.board_dimensions();
    println!("\nFinal position ({rows}x{rows}, O moved first):\n{}", result.final_board);
    let verdict = match human_outcome {
        Outcome::Win => "You win!",
        Outcome::Loss => "You lose.",
        _ => "Draw.",
    };
    println!(
        "{verdict} Score for O: {:+} after {} plies",
        game.score(&result.final_board, Player::Black),
        result.plies
    );
    Ok(())
}
