//! Interactive player reading moves from a text stream.

use std::io::{BufRead, Write};

use engine_core::{Board, Game, Player};

use crate::strategy::{Lifecycle, Strategy, StrategyError};

/// Reads `row col` (or `row,col`) coordinates, or `p`/`pass`.
///
/// Invalid or illegal input is reported and the prompt repeats.
pub struct HumanPlayer<'g, G: Game, R, W> {
    game: &'g G,
    input: R,
    output: W,
}

impl<'g, G: Game, R: BufRead, W: Write> HumanPlayer<'g, G, R, W> {
    pub fn new(game: &'g G, input: R, output: W) -> Self {
        Self {
            game,
            input,
            output,
        }
    }

    fn describe(&self, action: usize) -> String {
        match self.game.action_to_coords(action) {
            Some((r, c)) => format!("[{r} {c}]"),
            None => "[pass]".to_string(),
        }
    }

    fn parse(&self, line: &str) -> Option<usize> {
        let line = line.trim().to_ascii_lowercase();
        if line == "p" || line == "pass" {
            return Some(self.game.pass_action());
        }
        let mut parts = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty());
        let row = parts.next()?.parse().ok()?;
        let col = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        self.game.coords_to_action(row, col)
    }
}

impl<G: Game, R: BufRead, W: Write> Lifecycle for HumanPlayer<'_, G, R, W> {
    fn notify(&mut self, _board: &Board, action: usize) -> Result<(), StrategyError> {
        writeln!(self.output, "Opponent played {}", self.describe(action))?;
        Ok(())
    }
}

impl<G: Game, R: BufRead, W: Write> Strategy for HumanPlayer<'_, G, R, W> {
    fn select_action(&mut self, board: &Board) -> Result<usize, StrategyError> {
        // Canonical board: the human is always O.
        write!(self.output, "\n{board}")?;
        let legal = self.game.legal_actions(board, Player::Black);
        let moves: Vec<String> = legal.legal_actions().map(|a| self.describe(a)).collect();
        writeln!(self.output, "You play O: {}", moves.join(" "))?;

        let mut line = String::new();
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Err(StrategyError::InputClosed);
            }
            match self.parse(&line) {
                Some(action) if legal.is_legal(action) => return Ok(action),
                _ => writeln!(self.output, "Invalid move")?,
            }
        }
    }
}
