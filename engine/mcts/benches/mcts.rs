//! MCTS benchmarks for performance profiling.
//!
//! Run with: `cargo bench -p mcts`
//!
//! These benchmarks measure:
//! - Full search with varying simulation counts
//! - Search from different Othello phases (opening, midgame)
//! - Game comparison (Othello vs territory)
//! - Linear evaluator inference

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use engine_core::{Board, Game, Player};
use games_othello::Othello;
use games_territory::Territory;
use mcts::{Evaluator, LinearConfig, LinearEvaluator, MctsConfig, MctsSearch, UniformEvaluator};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Play `plies` random moves from the initial position and return the
/// canonical board for the side to move.
fn random_position<G: Game>(game: &G, plies: usize, seed: u64) -> Board {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut board = game.initial_board();
    let mut player = Player::Black;
    for _ in 0..plies {
        if game.outcome(&board, player).is_terminal() {
            break;
        }
        let legal: Vec<usize> = game.legal_actions(&board, player).legal_actions().collect();
        let action = legal[rng.gen_range(0..legal.len())];
        let (next, next_player) = game.next_state(&board, player, action).unwrap();
        board = next;
        player = next_player;
    }
    game.canonical_form(&board, player)
}

fn bench_search_simulations(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_search_simulations");
    let game = Othello::new(6).unwrap();
    let evaluator = UniformEvaluator::new(game.action_size());
    let board = game.initial_board();

    for sims in [25, 50, 100, 200, 400] {
        group.throughput(Throughput::Elements(sims as u64));
        group.bench_with_input(BenchmarkId::new("othello6", sims), &sims, |b, &sims| {
            let config = MctsConfig::for_testing().with_simulations(sims);
            b.iter(|| {
                let rng = ChaCha20Rng::seed_from_u64(42);
                let mut search = MctsSearch::new(&game, &evaluator, config.clone(), rng);
                black_box(search.action_probabilities(&board, 1.0).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_game_phases(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_game_phases");
    let game = Othello::new(6).unwrap();
    let evaluator = UniformEvaluator::new(game.action_size());
    let config = MctsConfig::for_testing().with_simulations(100);

    for (name, plies) in [("opening", 0), ("midgame", 12), ("late", 24)] {
        let board = random_position(&game, plies, 7);
        group.bench_function(name, |b| {
            b.iter(|| {
                let rng = ChaCha20Rng::seed_from_u64(42);
                let mut search = MctsSearch::new(&game, &evaluator, config.clone(), rng);
                black_box(search.action_probabilities(&board, 0.0).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_game_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("mcts_game_comparison");
    let config = MctsConfig::for_testing().with_simulations(100);

    let othello = Othello::new(6).unwrap();
    let othello_eval = UniformEvaluator::new(othello.action_size());
    let othello_board = othello.initial_board();
    group.bench_function("othello6", |b| {
        b.iter(|| {
            let rng = ChaCha20Rng::seed_from_u64(1);
            let mut search = MctsSearch::new(&othello, &othello_eval, config.clone(), rng);
            black_box(search.action_probabilities(&othello_board, 1.0).unwrap())
        });
    });

    let territory = Territory::new(9).unwrap();
    let territory_eval = UniformEvaluator::new(territory.action_size());
    let territory_board = territory.initial_board();
    group.bench_function("territory9", |b| {
        b.iter(|| {
            let rng = ChaCha20Rng::seed_from_u64(1);
            let mut search = MctsSearch::new(&territory, &territory_eval, config.clone(), rng);
            black_box(search.action_probabilities(&territory_board, 1.0).unwrap())
        });
    });

    group.finish();
}

fn bench_linear_predict(c: &mut Criterion) {
    let game = Othello::new(6).unwrap();
    let mut rng = ChaCha20Rng::seed_from_u64(3);
    let evaluator =
        LinearEvaluator::new(6, game.action_size(), LinearConfig::default(), &mut rng);
    let board = random_position(&game, 10, 3);

    c.bench_function("linear_predict_othello6", |b| {
        b.iter(|| black_box(evaluator.predict(black_box(&board)).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_search_simulations,
    bench_game_phases,
    bench_game_comparison,
    bench_linear_predict,
);
criterion_main!(benches);
