//! Core traits and types for the Zeroplay game engine
//!
//! This crate provides the fundamental abstractions shared by the search,
//! arena and training layers:
//! - `Board`: immutable-per-turn square grid of signed cell values
//! - `Player`: the two sides, with `Black` always moving first
//! - `Game`: pure, stateless rules contract each game implements
//! - `ActionMask` / `Outcome`: legal-move bit vector and terminal results
//! - `Fingerprint`: exact hashable key of a board, used by search caches
//!
//! # Canonical form
//!
//! Search and evaluation operate on canonical boards, where the player to move
//! is always represented by `BLACK` (+1). `Game::canonical_form` produces them.

pub mod board;
pub mod game;
pub mod game_utils;

// Re-export main types for convenience
pub use board::{Board, Fingerprint, Player, BLACK, EMPTY, WHITE};
pub use game::{ActionMask, Game, GameError, Outcome};
pub use game_utils::dihedral_symmetries;
