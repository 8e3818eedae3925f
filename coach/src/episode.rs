//! One self-play episode.

use engine_core::{Board, Game, Outcome, Player};
use mcts::{sample_action, Evaluator, MctsConfig, MctsSearch, SearchStats, TrainingExample};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::{debug, trace};

use crate::error::CoachError;

/// Examples and bookkeeping from a finished episode.
#[derive(Debug, Clone)]
pub struct Episode {
    pub examples: Vec<TrainingExample>,
    pub plies: u32,
    /// Result from the first mover's (Black's) perspective.
    pub outcome: Outcome,
    pub search: SearchStats,
}

/// Plies allowed before an episode is abandoned.
pub fn ply_limit<G: Game>(game: &G) -> u32 {
    (game.action_size() as u32).saturating_mul(4)
}

/// Play one game against itself with a fresh search engine.
///
/// Moves `1..=temp_threshold` sample at temperature 1, later moves play the
/// most visited action. Every symmetry of each visited `(board, policy)` pair
/// is recorded, and once the game ends each record is labelled with the
/// final value from its own mover's side.
pub fn run_episode<G: Game, E: Evaluator>(
    game: &G,
    evaluator: &E,
    config: &MctsConfig,
    temp_threshold: u32,
    seed: u64,
) -> Result<Episode, CoachError> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let search_rng = ChaCha20Rng::seed_from_u64(rng.gen());
    let mut search = MctsSearch::new(game, evaluator, config.clone(), search_rng);

    let limit = ply_limit(game);
    let mut records: Vec<(Board, Vec<f32>, Player)> = Vec::new();
    let mut board = game.initial_board();
    let mut player = Player::Black;
    let mut ply = 0u32;

    loop {
        ply += 1;
        if ply > limit {
            return Err(CoachError::EpisodeTooLong { limit });
        }

        let canonical = game.canonical_form(&board, player);
        let temperature = if ply <= temp_threshold { 1.0 } else { 0.0 };
        let policy = search.action_probabilities(&canonical, temperature)?;

        for (sym_board, sym_policy) in game.symmetries(&canonical, &policy) {
            records.push((sym_board, sym_policy, player));
        }

        let action = sample_action(&policy, &mut rng)?;
        trace!(ply, %player, action, temperature, "Self-play move");
        let (next, next_player) = game.next_state(&board, player, action)?;
        board = next;
        player = next_player;

        let outcome = game.outcome(&board, player);
        if outcome.is_terminal() {
            let value = outcome.value();
            let examples = records
                .into_iter()
                .map(|(board, policy, mover)| TrainingExample {
                    board,
                    policy,
                    value: if mover == player { value } else { -value },
                })
                .collect();
            let first_mover = match player {
                Player::Black => outcome,
                Player::White => outcome.flipped(),
            };
            debug!(plies = ply, outcome = %first_mover, seed, "Episode finished");
            return Ok(Episode {
                examples,
                plies: ply,
                outcome: first_mover,
                search: search.stats(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use games_othello::Othello;
    use games_territory::Territory;
    use mcts::UniformEvaluator;

    #[test]
    fn test_episode_labels_alternate_with_mover() {
        let game = Territory::new(3).unwrap();
        let evaluator = UniformEvaluator::new(game.action_size());
        let config = MctsConfig::for_testing().with_simulations(4);

        let episode = run_episode(&game, &evaluator, &config, 2, 11).unwrap();
        // Territory never draws and has no pass: one identity record per ply.
        assert_eq!(episode.examples.len(), episode.plies as usize);
        assert!(episode.outcome == Outcome::Win || episode.outcome == Outcome::Loss);
        let black_value = episode.outcome.value();
        for (i, example) in episode.examples.iter().enumerate() {
            let expected = if i % 2 == 0 { black_value } else { -black_value };
            assert_eq!(example.value, expected, "ply {}", i + 1);
        }
    }

    #[test]
    fn test_othello_episode_records_symmetries() {
        let game = Othello::new(4).unwrap();
        let evaluator = UniformEvaluator::new(game.action_size());
        let config = MctsConfig::for_testing().with_simulations(8);

        let episode = run_episode(&game, &evaluator, &config, 3, 5).unwrap();
        assert_eq!(episode.examples.len(), 8 * episode.plies as usize);
        for example in &episode.examples {
            assert_eq!(example.policy.len(), game.action_size());
            assert!((example.policy.iter().sum::<f32>() - 1.0).abs() < 1e-4);
            assert!(example.value.abs() <= 1.0);
        }
        assert!(episode.search.simulations > 0);
    }

    #[test]
    fn test_episode_is_reproducible_from_seed() {
        let game = Othello::new(4).unwrap();
        let evaluator = UniformEvaluator::new(game.action_size());
        let config = MctsConfig::for_testing().with_simulations(6);

        let a = run_episode(&game, &evaluator, &config, 100, 3).unwrap();
        let b = run_episode(&game, &evaluator, &config, 100, 3).unwrap();
        assert_eq!(a.examples, b.examples);
        assert_eq!(a.plies, b.plies);
    }

    #[test]
    fn test_ply_limit() {
        assert_eq!(ply_limit(&Othello::new(6).unwrap()), 37 * 4);
        assert_eq!(ply_limit(&Territory::new(9).unwrap()), 82 * 4);
    }
}
