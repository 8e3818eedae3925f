//! Game and match runner.

use std::io::IsTerminal;

use engine_core::{Board, Game, GameError, Outcome, Player};
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::strategy::{Strategy, StrategyError};

/// Errors that abort a game or match.
#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("{player} chose illegal action {action}")]
    InvalidMove { player: Player, action: usize },

    #[error("strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("game error: {0}")]
    Game(#[from] GameError),
}

/// Result of a single game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameResult {
    /// Outcome from the first mover's perspective.
    pub outcome: Outcome,
    pub plies: u32,
    pub final_board: Board,
}

/// Aggregate of a match between strategies `a` and `b`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub wins_a: u32,
    pub wins_b: u32,
    pub draws: u32,
}

impl MatchResult {
    pub fn games(&self) -> u32 {
        self.wins_a + self.wins_b + self.draws
    }

    /// Games that ended with a winner.
    pub fn decisive(&self) -> u32 {
        self.wins_a + self.wins_b
    }

    /// Fraction of all games won by `a`; 0 for an empty match.
    pub fn win_rate_a(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            n => self.wins_a as f64 / n as f64,
        }
    }

    pub fn draw_rate(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            n => self.draws as f64 / n as f64,
        }
    }

    /// The same match seen from `b`'s side.
    pub fn swapped(self) -> Self {
        Self {
            wins_a: self.wins_b,
            wins_b: self.wins_a,
            draws: self.draws,
        }
    }
}

/// Plays games between two strategies on one rule set.
///
/// The arena holds no state between games, so independent arenas can run
/// concurrently.
pub struct Arena<'g, G: Game> {
    game: &'g G,
    show_progress: bool,
}

impl<'g, G: Game> Arena<'g, G> {
    pub fn new(game: &'g G) -> Self {
        Self {
            game,
            show_progress: false,
        }
    }

    /// Show a progress bar during matches when stderr is a terminal.
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    pub fn game(&self) -> &G {
        self.game
    }

    /// Play one game; `first` moves as Black.
    ///
    /// `end_game` hooks run even when the game is aborted.
    pub fn play_game(
        &self,
        first: &mut dyn Strategy,
        second: &mut dyn Strategy,
    ) -> Result<GameResult, ArenaError> {
        first.start_game()?;
        if let Err(e) = second.start_game() {
            let _ = first.end_game();
            return Err(e.into());
        }

        let result = self.run_game(&mut *first, &mut *second);

        let end_first = first.end_game();
        let end_second = second.end_game();
        let result = result?;
        end_first?;
        end_second?;
        Ok(result)
    }

    fn run_game(
        &self,
        first: &mut dyn Strategy,
        second: &mut dyn Strategy,
    ) -> Result<GameResult, ArenaError> {
        let mut board = self.game.initial_board();
        let mut player = Player::Black;
        let mut plies = 0u32;

        loop {
            let outcome = self.game.outcome(&board, player);
            if outcome.is_terminal() {
                let outcome = match player {
                    Player::Black => outcome,
                    Player::White => outcome.flipped(),
                };
                debug!(plies, %outcome, "Game finished");
                return Ok(GameResult {
                    outcome,
                    plies,
                    final_board: board,
                });
            }

            let (mover, opponent): (&mut dyn Strategy, &mut dyn Strategy) = match player {
                Player::Black => (&mut *first, &mut *second),
                Player::White => (&mut *second, &mut *first),
            };

            let canonical = self.game.canonical_form(&board, player);
            let action = mover.select_action(&canonical)?;
            let legal = self.game.legal_actions(&canonical, Player::Black);
            if !legal.is_legal(action) {
                let valid: Vec<usize> = legal.legal_actions().collect();
                error!(%player, action, ?valid, "Invalid action attempted");
                return Err(ArenaError::InvalidMove { player, action });
            }

            opponent.notify(&board, action)?;

            let (next, next_player) = self.game.next_state(&board, player, action)?;
            board = next;
            player = next_player;
            plies += 1;
        }
    }

    /// Play `total_games / 2` games with `a` first, then as many with `b`
    /// first. Odd counts are truncated.
    pub fn play_match(
        &self,
        a: &mut dyn Strategy,
        b: &mut dyn Strategy,
        total_games: u32,
    ) -> Result<MatchResult, ArenaError> {
        let half = total_games / 2;
        let progress = self.progress_bar(half as u64 * 2);
        let mut result = MatchResult::default();

        for _ in 0..half {
            let game = self.play_game(&mut *a, &mut *b)?;
            match game.outcome {
                Outcome::Win => result.wins_a += 1,
                Outcome::Loss => result.wins_b += 1,
                _ => result.draws += 1,
            }
            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }

        for _ in 0..half {
            let game = self.play_game(&mut *b, &mut *a)?;
            match game.outcome {
                Outcome::Win => result.wins_b += 1,
                Outcome::Loss => result.wins_a += 1,
                _ => result.draws += 1,
            }
            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        info!(
            env_id = self.game.env_id(),
            wins_a = result.wins_a,
            wins_b = result.wins_b,
            draws = result.draws,
            "Match finished"
        );
        Ok(result)
    }

    fn progress_bar(&self, len: u64) -> Option<ProgressBar> {
        if !self.show_progress || len == 0 || !std::io::stderr().is_terminal() {
            return None;
        }
        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} games ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    }
}
