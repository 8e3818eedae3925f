//! Monte Carlo Tree Search (MCTS) for AlphaZero-style self-play.
//!
//! This crate provides a game-agnostic PUCT search that works with any game
//! implementing the `engine-core` [`Game`](engine_core::Game) trait, guided by
//! a policy/value [`Evaluator`].
//!
//! # Overview
//!
//! Search statistics are keyed by the fingerprint of the canonical board, so
//! transpositions share a single record. Each simulation:
//!
//! 1. **Lookup**: find or create the record, caching terminal status
//! 2. **Expansion**: on first visit, store the evaluator prior masked to legal
//!    actions and return the value estimate
//! 3. **Selection**: on later visits, pick
//!    `Q + c_puct * P * sqrt(N(s)) / (1 + N(s,a))` over legal actions
//! 4. **Backup**: update `Q` and `N` along the path, negating per ply
//!
//! # Usage
//!
//! ```rust
//! use engine_core::Game;
//! use games_othello::Othello;
//! use mcts::{MctsConfig, MctsSearch, UniformEvaluator};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let game = Othello::new(6).unwrap();
//! let evaluator = UniformEvaluator::new(game.action_size());
//! let rng = ChaCha20Rng::seed_from_u64(42);
//! let mut search = MctsSearch::new(&game, &evaluator, MctsConfig::for_testing(), rng);
//!
//! let probs = search.action_probabilities(&game.initial_board(), 1.0).unwrap();
//! assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-5);
//! ```
//!
//! # Evaluators
//!
//! - [`UniformEvaluator`]: uniform prior and zero value (for testing)
//! - [`LinearEvaluator`]: trainable softmax/tanh linear model with JSON
//!   snapshots

pub mod config;
pub mod evaluator;
pub mod linear;
pub mod node;
pub mod search;
pub mod tree;

// Re-export main types
pub use config::MctsConfig;
pub use evaluator::{
    read_json, write_json_atomic, EvalResult, Evaluator, EvaluatorError, TrainableEvaluator,
    TrainingExample, TrainingReport, UniformEvaluator,
};
pub use linear::{LinearConfig, LinearEvaluator};
pub use node::{EdgeStats, NodeId, NodeStats};
pub use search::{sample_action, MctsSearch, SearchError, SearchStats};
pub use tree::{SearchCache, TreeStats};
