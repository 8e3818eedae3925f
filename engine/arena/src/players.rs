//! Built-in strategies: random, greedy and search-driven.

use engine_core::{Board, Game, Player};
use mcts::{sample_action, Evaluator, MctsConfig, MctsSearch, SearchStats};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::strategy::{Lifecycle, Strategy, StrategyError};

/// Uniformly random legal action.
pub struct RandomPlayer<'g, G: Game> {
    game: &'g G,
    rng: ChaCha20Rng,
}

impl<'g, G: Game> RandomPlayer<'g, G> {
    pub fn new(game: &'g G, rng: ChaCha20Rng) -> Self {
        Self { game, rng }
    }
}

impl<G: Game> Lifecycle for RandomPlayer<'_, G> {}

impl<G: Game> Strategy for RandomPlayer<'_, G> {
    fn select_action(&mut self, board: &Board) -> Result<usize, StrategyError> {
        let legal: Vec<usize> = self
            .game
            .legal_actions(board, Player::Black)
            .legal_actions()
            .collect();
        if legal.is_empty() {
            return Err(StrategyError::NoLegalMoves);
        }
        Ok(legal[self.rng.gen_range(0..legal.len())])
    }
}

/// One-ply lookahead maximising the game's score heuristic.
/// Ties go to the lowest action index.
pub struct GreedyPlayer<'g, G: Game> {
    game: &'g G,
}

impl<'g, G: Game> GreedyPlayer<'g, G> {
    pub fn new(game: &'g G) -> Self {
        Self { game }
    }
}

impl<G: Game> Lifecycle for GreedyPlayer<'_, G> {}

impl<G: Game> Strategy for GreedyPlayer<'_, G> {
    fn select_action(&mut self, board: &Board) -> Result<usize, StrategyError> {
        let mut best: Option<(usize, i32)> = None;
        for action in self.game.legal_actions(board, Player::Black).legal_actions() {
            let (next, _) = self.game.next_state(board, Player::Black, action)?;
            let score = self.game.score(&next, Player::Black);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((action, score)),
            }
        }
        best.map(|(a, _)| a).ok_or(StrategyError::NoLegalMoves)
    }
}

/// Search-driven strategy. Statistics persist across every game it plays.
///
/// At temperature 0 it plays the most visited action; otherwise it samples
/// from the visit distribution.
pub struct MctsPlayer<'a, G: Game, E: Evaluator> {
    search: MctsSearch<'a, G, E>,
    temperature: f32,
    rng: ChaCha20Rng,
}

impl<'a, G: Game, E: Evaluator> MctsPlayer<'a, G, E> {
    pub fn new(game: &'a G, evaluator: &'a E, config: MctsConfig, rng: ChaCha20Rng) -> Self {
        let mut rng = rng;
        let search_rng = ChaCha20Rng::seed_from_u64(rng.gen());
        Self {
            search: MctsSearch::new(game, evaluator, config, search_rng),
            temperature: 0.0,
            rng,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn stats(&self) -> SearchStats {
        self.search.stats()
    }
}

impl<G: Game, E: Evaluator> Lifecycle for MctsPlayer<'_, G, E> {}

impl<G: Game, E: Evaluator> Strategy for MctsPlayer<'_, G, E> {
    fn select_action(&mut self, board: &Board) -> Result<usize, StrategyError> {
        let probs = self.search.action_probabilities(board, self.temperature)?;
        if self.temperature == 0.0 {
            return probs
                .iter()
                .enumerate()
                .fold(None, |best: Option<(usize, f32)>, (a, &p)| match best {
                    Some((_, bp)) if p <= bp => best,
                    _ => Some((a, p)),
                })
                .map(|(a, _)| a)
                .ok_or(StrategyError::NoLegalMoves);
        }
        Ok(sample_action(&probs, &mut self.rng)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{BLACK, EMPTY, WHITE};
    use games_othello::Othello;
    use games_territory::Territory;
    use mcts::UniformEvaluator;

    #[test]
    fn test_random_player_only_plays_legal_moves() {
        let game = Othello::new(6).unwrap();
        let board = game.initial_board();
        let legal = game.legal_actions(&board, Player::Black);
        let mut player = RandomPlayer::new(&game, ChaCha20Rng::seed_from_u64(3));
        for _ in 0..50 {
            assert!(legal.is_legal(player.select_action(&board).unwrap()));
        }
    }

    #[test]
    fn test_greedy_player_maximises_stone_difference() {
        let game = Othello::new(4).unwrap();
        // Playing (3,3) flips two white stones; (0,3) flips only one.
        let board = Board::from_cells(
            4,
            vec![
                EMPTY, BLACK, WHITE, EMPTY, //
                EMPTY, EMPTY, EMPTY, EMPTY, //
                EMPTY, EMPTY, EMPTY, EMPTY, //
                BLACK, WHITE, WHITE, EMPTY,
            ],
        )
        .unwrap();
        let mut player = GreedyPlayer::new(&game);
        assert_eq!(player.select_action(&board).unwrap(), 15);
    }

    #[test]
    fn test_greedy_player_ties_go_to_lowest_index() {
        let game = Territory::new(3).unwrap();
        let mut player = GreedyPlayer::new(&game);
        assert_eq!(player.select_action(&game.initial_board()).unwrap(), 0);
    }

    #[test]
    fn test_mcts_player_picks_legal_argmax() {
        let game = Othello::new(6).unwrap();
        let evaluator = UniformEvaluator::new(game.action_size());
        let mut player = MctsPlayer::new(
            &game,
            &evaluator,
            MctsConfig::for_testing(),
            ChaCha20Rng::seed_from_u64(9),
        );
        let board = game.initial_board();
        let action = player.select_action(&board).unwrap();
        assert!(game.legal_actions(&board, Player::Black).is_legal(action));
        assert!(player.stats().simulations > 0);
    }

    #[test]
    fn test_mcts_player_sampling_with_temperature() {
        let game = Othello::new(6).unwrap();
        let evaluator = UniformEvaluator::new(game.action_size());
        let mut player = MctsPlayer::new(
            &game,
            &evaluator,
            MctsConfig::for_testing(),
            ChaCha20Rng::seed_from_u64(9),
        )
        .with_temperature(1.0);
        let board = game.initial_board();
        let legal = game.legal_actions(&board, Player::Black);
        for _ in 0..5 {
            assert!(legal.is_legal(player.select_action(&board).unwrap()));
        }
    }
}
