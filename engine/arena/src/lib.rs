//! Head-to-head play between strategies.
//!
//! An [`Arena`] drives one rule set. Strategies only ever see the canonical
//! board, with the mover as `BLACK`, and answer with an action index.
//!
//! ```rust
//! use arena::{Arena, GreedyPlayer, RandomPlayer};
//! use games_othello::Othello;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let game = Othello::new(6).unwrap();
//! let arena = Arena::new(&game);
//! let mut greedy = GreedyPlayer::new(&game);
//! let mut random = RandomPlayer::new(&game, ChaCha20Rng::seed_from_u64(1));
//! let result = arena.play_match(&mut greedy, &mut random, 4).unwrap();
//! assert_eq!(result.games(), 4);
//! ```

pub mod arena;
pub mod gtp;
pub mod human;
pub mod players;
pub mod strategy;

pub use arena::{Arena, ArenaError, GameResult, MatchResult};
pub use gtp::GtpPlayer;
pub use human::HumanPlayer;
pub use players::{GreedyPlayer, MctsPlayer, RandomPlayer};
pub use strategy::{Lifecycle, Strategy, StrategyError};
