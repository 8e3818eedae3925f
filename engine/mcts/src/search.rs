//! MCTS search implementation.
//!
//! Each simulation walks down from the root with an explicit path stack:
//! 1. Lookup: fingerprint the canonical state, caching its terminal status
//! 2. Expansion: on the first non-terminal visit, query the evaluator and
//!    store the masked prior
//! 3. Selection: otherwise pick the legal action with the best PUCT score
//!    and descend into the re-canonicalised successor
//! 4. Backup: fold the leaf value into every edge on the path, flipping the
//!    sign at each ply

use engine_core::{ActionMask, Board, Game, GameError, Player};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{trace, warn};

use crate::config::MctsConfig;
use crate::evaluator::{EvalResult, Evaluator, EvaluatorError};
use crate::node::{NodeId, NodeStats};
use crate::tree::{SearchCache, TreeStats};

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error("Malformed evaluation: {0}")]
    MalformedEvaluation(String),

    #[error("Invalid temperature {0}: must be finite and >= 0")]
    InvalidTemperature(f32),

    #[error("Root state is terminal")]
    TerminalRoot,

    #[error("No legal moves available")]
    NoLegalMoves,
}

/// Counters accumulated over the lifetime of one search engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub simulations: u64,
    pub expansions: u64,
    pub terminal_hits: u64,
    pub evaluator_calls: u64,
    /// Expansions where the prior put no mass on any legal action.
    pub anomalies: u64,
}

/// MCTS engine over canonical boards.
///
/// Statistics persist across calls, so one engine serves every move of a
/// self-play episode (or every game of an arena match) and reuses the
/// subtrees it has already explored.
pub struct MctsSearch<'a, G: Game, E: Evaluator> {
    game: &'a G,
    evaluator: &'a E,
    config: MctsConfig,
    cache: SearchCache,
    rng: ChaCha20Rng,
    stats: SearchStats,
}

impl<'a, G: Game, E: Evaluator> MctsSearch<'a, G, E> {
    /// Create a search engine. `rng` breaks ties in temperature-0 readout.
    pub fn new(game: &'a G, evaluator: &'a E, config: MctsConfig, rng: ChaCha20Rng) -> Self {
        Self {
            game,
            evaluator,
            config,
            cache: SearchCache::new(),
            rng,
            stats: SearchStats::default(),
        }
    }

    /// Run the simulation budget from `board` and read out a policy.
    ///
    /// `board` must be canonical. With `temperature == 0` the result is
    /// one-hot on a most-visited action (ties broken at random); otherwise
    /// it is proportional to `N(root, a)^(1 / temperature)`. If no root edge
    /// has been visited yet, the masked root prior is returned.
    pub fn action_probabilities(
        &mut self,
        board: &Board,
        temperature: f32,
    ) -> Result<Vec<f32>, SearchError> {
        if !temperature.is_finite() || temperature < 0.0 {
            return Err(SearchError::InvalidTemperature(temperature));
        }

        let budget = self.config.num_simulations.max(1);
        for _ in 0..budget {
            self.simulate(board)?;
        }

        let fingerprint = self.game.fingerprint(board);
        let root = self
            .cache
            .node(&fingerprint)
            .ok_or(SearchError::NoLegalMoves)?;
        if root.is_terminal() {
            return Err(SearchError::TerminalRoot);
        }

        let counts = root.visit_counts();
        let max = counts.iter().copied().max().unwrap_or(0);
        if max == 0 {
            return Ok(root.priors.clone());
        }

        if temperature == 0.0 {
            let best: Vec<usize> = counts
                .iter()
                .enumerate()
                .filter_map(|(a, &n)| if n == max { Some(a) } else { None })
                .collect();
            let pick = best[self.rng.gen_range(0..best.len())];
            let mut probs = vec![0.0; counts.len()];
            probs[pick] = 1.0;
            return Ok(probs);
        }

        let exponent = 1.0 / temperature as f64;
        let scaled: Vec<f64> = counts
            .iter()
            .map(|&n| (n as f64 / max as f64).powf(exponent))
            .collect();
        let total: f64 = scaled.iter().sum();
        Ok(scaled.into_iter().map(|x| (x / total) as f32).collect())
    }

    /// One simulation from the canonical `board`.
    ///
    /// Returns the negated value of `board` from its mover's perspective.
    pub fn simulate(&mut self, board: &Board) -> Result<f32, SearchError> {
        self.stats.simulations += 1;
        let mut current = board.clone();
        let mut path: Vec<(NodeId, usize)> = Vec::new();

        let leaf_value = loop {
            let fingerprint = self.game.fingerprint(&current);
            let id = match self.cache.lookup(&fingerprint) {
                Some(id) => id,
                None => {
                    let outcome = self.game.outcome(&current, Player::Black);
                    self.cache.insert(fingerprint, NodeStats::new(outcome))
                }
            };

            let node = self.cache.get(id);
            if node.is_terminal() {
                self.stats.terminal_hits += 1;
                break -node.terminal.value();
            }
            if !node.expanded {
                break -self.expand(id, &current)?;
            }

            let action = node
                .select_action(self.config.c_puct)
                .ok_or(SearchError::NoLegalMoves)?;
            path.push((id, action));

            let (next, next_player) = self.game.next_state(&current, Player::Black, action)?;
            current = self.game.canonical_form(&next, next_player);
        };

        let depth = path.len();
        let mut value = leaf_value;
        for (id, action) in path.into_iter().rev() {
            self.cache.get_mut(id).backup(action, value);
            value = -value;
        }

        trace!(depth, leaf_value, "MCTS simulation complete");
        Ok(value)
    }

    /// Evaluate and store prior and mask for a new state. Returns the value
    /// estimate from the mover's perspective.
    fn expand(&mut self, id: NodeId, board: &Board) -> Result<f32, SearchError> {
        self.stats.evaluator_calls += 1;
        let eval = self.evaluator.predict(board)?;
        let action_size = self.game.action_size();
        validate_evaluation(&eval, action_size)?;

        let legal = self.game.legal_actions(board, Player::Black);
        let priors = self.mask_prior(&eval.policy, &legal);

        self.cache.get_mut(id).expand(priors, legal);
        self.stats.expansions += 1;
        Ok(eval.value)
    }

    fn mask_prior(&mut self, policy: &[f32], legal: &ActionMask) -> Vec<f32> {
        let mut priors: Vec<f32> = policy
            .iter()
            .enumerate()
            .map(|(a, &p)| if legal.is_legal(a) { p } else { 0.0 })
            .collect();
        let mass: f32 = priors.iter().sum();

        if mass > 0.0 {
            priors.iter_mut().for_each(|p| *p /= mass);
            return priors;
        }

        self.stats.anomalies += 1;
        warn!(
            legal_actions = legal.count(),
            "Evaluator anomaly: prior has no mass on legal actions, falling back to uniform"
        );
        for (a, p) in priors.iter_mut().enumerate() {
            if legal.is_legal(a) {
                *p += 1.0;
            }
        }
        let mass: f32 = priors.iter().sum();
        if mass > 0.0 {
            priors.iter_mut().for_each(|p| *p /= mass);
        }
        priors
    }

    /// Visit counts of the root edges for `board`, if it has been searched.
    pub fn visit_counts(&self, board: &Board) -> Option<Vec<u32>> {
        self.cache
            .node(&self.game.fingerprint(board))
            .map(|node| node.visit_counts())
    }

    /// Statistics record for `board`, if cached.
    pub fn node(&self, board: &Board) -> Option<&NodeStats> {
        self.cache.node(&self.game.fingerprint(board))
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn tree_stats(&self) -> TreeStats {
        self.cache.stats()
    }

    /// The transposition cache (for inspection/debugging).
    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Drop all cached statistics.
    pub fn reset(&mut self) {
        self.cache.clear();
    }
}

fn validate_evaluation(eval: &EvalResult, action_size: usize) -> Result<(), SearchError> {
    if eval.policy.len() != action_size {
        return Err(SearchError::MalformedEvaluation(format!(
            "policy has {} entries, expected {}",
            eval.policy.len(),
            action_size
        )));
    }
    if let Some((a, p)) = eval
        .policy
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p < 0.0)
    {
        return Err(SearchError::MalformedEvaluation(format!(
            "prior for action {a} is {p}"
        )));
    }
    if !eval.value.is_finite() {
        return Err(SearchError::MalformedEvaluation(format!(
            "value is {}",
            eval.value
        )));
    }
    Ok(())
}

/// Sample an action from a probability distribution.
pub fn sample_action(policy: &[f32], rng: &mut ChaCha20Rng) -> Result<usize, SearchError> {
    let r: f32 = rng.gen();
    let mut cumsum = 0.0;

    for (i, &p) in policy.iter().enumerate() {
        cumsum += p;
        if r < cumsum {
            return Ok(i);
        }
    }

    // Fallback to last non-zero action (handles floating point issues)
    for (i, &p) in policy.iter().enumerate().rev() {
        if p > 0.0 {
            return Ok(i);
        }
    }

    Err(SearchError::NoLegalMoves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::UniformEvaluator;
    use engine_core::{Outcome, BLACK, WHITE};
    use games_othello::Othello;
    use games_territory::Territory;
    use rand::SeedableRng;

    /// Evaluator returning a fixed policy and value.
    struct FixedEvaluator {
        policy: Vec<f32>,
        value: f32,
    }

    impl Evaluator for FixedEvaluator {
        fn predict(&self, _board: &Board) -> Result<EvalResult, EvaluatorError> {
            Ok(EvalResult {
                policy: self.policy.clone(),
                value: self.value,
            })
        }

        fn action_size(&self) -> usize {
            self.policy.len()
        }
    }

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(42)
    }

    #[test]
    fn test_policy_sums_to_one_over_legal_actions() {
        let game = Othello::new(6).unwrap();
        let evaluator = UniformEvaluator::new(game.action_size());
        let mut search = MctsSearch::new(&game, &evaluator, MctsConfig::for_testing(), rng());

        let board = game.initial_board();
        let legal = game.legal_actions(&board, Player::Black);
        for temp in [0.0, 0.5, 1.0] {
            let probs = search.action_probabilities(&board, temp).unwrap();
            assert_eq!(probs.len(), game.action_size());
            let sum: f32 = probs.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
            for (a, &p) in probs.iter().enumerate() {
                if !legal.is_legal(a) {
                    assert_eq!(p, 0.0, "illegal action {a} got mass");
                }
            }
        }
        assert!(search.cache().check_invariants().is_ok());
    }

    #[test]
    fn test_temperature_zero_is_one_hot_on_max() {
        let game = Othello::new(6).unwrap();
        let evaluator = UniformEvaluator::new(game.action_size());
        let config = MctsConfig::for_testing().with_simulations(40);
        let mut search = MctsSearch::new(&game, &evaluator, config, rng());

        let board = game.initial_board();
        let probs = search.action_probabilities(&board, 0.0).unwrap();
        let counts = search.visit_counts(&board).unwrap();
        let max = *counts.iter().max().unwrap();

        assert_eq!(probs.iter().filter(|&&p| p == 1.0).count(), 1);
        let chosen = probs.iter().position(|&p| p == 1.0).unwrap();
        assert_eq!(counts[chosen], max);
    }

    #[test]
    fn test_temperature_one_matches_visit_fractions() {
        let game = Othello::new(6).unwrap();
        let evaluator = UniformEvaluator::new(game.action_size());
        let mut search = MctsSearch::new(&game, &evaluator, MctsConfig::for_testing(), rng());

        let board = game.initial_board();
        let probs = search.action_probabilities(&board, 1.0).unwrap();
        let counts = search.visit_counts(&board).unwrap();
        let total: u32 = counts.iter().sum();
        for (p, n) in probs.iter().zip(counts) {
            assert!((p - n as f32 / total as f32).abs() < 1e-5);
        }
    }

    #[test]
    fn test_invalid_temperature() {
        let game = Othello::new(6).unwrap();
        let evaluator = UniformEvaluator::new(game.action_size());
        let mut search = MctsSearch::new(&game, &evaluator, MctsConfig::for_testing(), rng());
        let board = game.initial_board();

        for temp in [-1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                search.action_probabilities(&board, temp),
                Err(SearchError::InvalidTemperature(_))
            ));
        }
    }

    #[test]
    fn test_single_simulation_returns_masked_prior() {
        let game = Othello::new(6).unwrap();
        let mut policy = vec![0.0; game.action_size()];
        // Half the mass on an illegal corner.
        policy[0] = 0.5;
        policy[8] = 0.3;
        policy[27] = 0.2;
        let evaluator = FixedEvaluator { policy, value: 0.0 };
        let config = MctsConfig::for_testing().with_simulations(1);
        let mut search = MctsSearch::new(&game, &evaluator, config, rng());

        let probs = search
            .action_probabilities(&game.initial_board(), 1.0)
            .unwrap();
        assert_eq!(probs[0], 0.0);
        assert!((probs[8] - 0.6).abs() < 1e-6);
        assert!((probs[27] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_all_mass_on_illegal_actions_falls_back_to_uniform() {
        let game = Othello::new(6).unwrap();
        let mut policy = vec![0.0; game.action_size()];
        policy[0] = 1.0;
        let evaluator = FixedEvaluator { policy, value: 0.0 };
        let config = MctsConfig::for_testing().with_simulations(1);
        let mut search = MctsSearch::new(&game, &evaluator, config, rng());

        let board = game.initial_board();
        let probs = search.action_probabilities(&board, 1.0).unwrap();
        for a in [8, 13, 22, 27] {
            assert!((probs[a] - 0.25).abs() < 1e-6);
        }
        assert_eq!(search.stats().anomalies, 1);
    }

    #[test]
    fn test_malformed_evaluation_fails_fast() {
        let game = Othello::new(6).unwrap();
        let board = game.initial_board();

        let short = FixedEvaluator {
            policy: vec![1.0; 3],
            value: 0.0,
        };
        let mut search = MctsSearch::new(&game, &short, MctsConfig::for_testing(), rng());
        assert!(matches!(
            search.action_probabilities(&board, 1.0),
            Err(SearchError::MalformedEvaluation(_))
        ));

        let mut policy = vec![0.1; game.action_size()];
        policy[8] = f32::NAN;
        let nan = FixedEvaluator { policy, value: 0.0 };
        let mut search = MctsSearch::new(&game, &nan, MctsConfig::for_testing(), rng());
        assert!(matches!(
            search.action_probabilities(&board, 1.0),
            Err(SearchError::MalformedEvaluation(_))
        ));

        let bad_value = FixedEvaluator {
            policy: vec![0.1; game.action_size()],
            value: f32::INFINITY,
        };
        let mut search = MctsSearch::new(&game, &bad_value, MctsConfig::for_testing(), rng());
        assert!(matches!(
            search.action_probabilities(&board, 1.0),
            Err(SearchError::MalformedEvaluation(_))
        ));
    }

    #[test]
    fn test_terminal_root_is_error() {
        let game = Territory::new(3).unwrap();
        let board = Board::from_cells(3, vec![BLACK; 9]).unwrap();
        assert_eq!(game.outcome(&board, Player::Black), Outcome::Loss);

        let evaluator = UniformEvaluator::new(game.action_size());
        let mut search = MctsSearch::new(&game, &evaluator, MctsConfig::for_testing(), rng());
        assert!(matches!(
            search.action_probabilities(&board, 1.0),
            Err(SearchError::TerminalRoot)
        ));
    }

    #[test]
    fn test_winning_move_backs_up_positive_value() {
        // Othello endgame: black's only move wins outright.
        let game = Othello::new(4).unwrap();
        let board = Board::from_cells(
            4,
            vec![
                BLACK, BLACK, BLACK, BLACK, //
                BLACK, BLACK, BLACK, BLACK, //
                BLACK, BLACK, WHITE, WHITE, //
                BLACK, BLACK, WHITE, 0,
            ],
        )
        .unwrap();
        let evaluator = UniformEvaluator::new(game.action_size());
        let config = MctsConfig::for_testing().with_simulations(10);
        let mut search = MctsSearch::new(&game, &evaluator, config, rng());
        let probs = search.action_probabilities(&board, 0.0).unwrap();
        assert_eq!(probs[15], 1.0);

        let root = search.node(&board).unwrap();
        assert!(root.edges[15].q > 0.99);
    }

    #[test]
    fn test_sample_action_respects_distribution() {
        let mut rng = rng();
        let policy = vec![0.0, 1.0, 0.0];
        for _ in 0..20 {
            assert_eq!(sample_action(&policy, &mut rng).unwrap(), 1);
        }
        assert!(matches!(
            sample_action(&[0.0, 0.0], &mut rng),
            Err(SearchError::NoLegalMoves)
        ));
    }
}
