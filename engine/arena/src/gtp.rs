//! Strategy backed by an external engine speaking a GTP-style text protocol.
//!
//! Each game spawns a fresh process, sends `boardsize` and `clear_board`,
//! relays opponent moves with `play` and asks for moves with `genmove`.
//! Moves are written as a column letter followed by a 1-based row (`C4`),
//! or `PASS`.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use engine_core::{Board, Player};
use tracing::{debug, warn};

use crate::strategy::{Lifecycle, Strategy, StrategyError};

const QUIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Format an action index as a protocol move on an `n`x`n` board.
pub fn action_to_move(action: usize, n: usize) -> String {
    if action < n * n {
        let (row, col) = (action / n, action % n);
        format!("{}{}", (b'A' + col as u8) as char, row + 1)
    } else {
        "PASS".to_string()
    }
}

/// Parse a protocol move into an action index on an `n`x`n` board.
pub fn move_to_action(mv: &str, n: usize) -> Result<usize, StrategyError> {
    let mv = mv.trim().to_ascii_uppercase();
    if mv == "PASS" {
        return Ok(n * n);
    }
    let bad = || StrategyError::Protocol(format!("unparseable move '{mv}'"));
    let mut chars = mv.chars();
    let letter = chars.next().ok_or_else(bad)?;
    if !letter.is_ascii_uppercase() {
        return Err(bad());
    }
    let col = (letter as u8 - b'A') as usize;
    let row: usize = chars.as_str().parse().map_err(|_| bad())?;
    if row == 0 || row > n || col >= n {
        return Err(bad());
    }
    Ok((row - 1) * n + col)
}

/// One command/response exchange channel.
///
/// A response is every line up to the first blank line after content. It
/// begins with `=` on success; anything else is an error reply.
pub struct GtpSession<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> GtpSession<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Send a command and return the upper-cased payload of a success reply.
    pub fn send(&mut self, command: &str) -> Result<String, StrategyError> {
        debug!(command, "GTP send");
        writeln!(self.writer, "{command}")?;
        self.writer.flush()?;

        let mut response = String::new();
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                if response.is_empty() {
                    return Err(StrategyError::InputClosed);
                }
                break;
            }
            if line.trim().is_empty() {
                if response.is_empty() {
                    continue;
                }
                break;
            }
            response.push_str(&line);
        }

        match response.strip_prefix('=') {
            Some(payload) => Ok(payload.trim().to_ascii_uppercase()),
            None => Err(StrategyError::Protocol(format!(
                "'{command}' failed: {}",
                response.get(1..).unwrap_or("").trim()
            ))),
        }
    }
}

/// External engine player. The command is run once per game.
pub struct GtpPlayer {
    program: String,
    args: Vec<String>,
    board_size: usize,
    turn: Player,
    child: Option<Child>,
    session: Option<GtpSession<BufReader<ChildStdout>, ChildStdin>>,
}

impl GtpPlayer {
    pub fn new(program: impl Into<String>, args: Vec<String>, board_size: usize) -> Self {
        Self {
            program: program.into(),
            args,
            board_size,
            turn: Player::Black,
            child: None,
            session: None,
        }
    }

    fn session(
        &mut self,
    ) -> Result<&mut GtpSession<BufReader<ChildStdout>, ChildStdin>, StrategyError> {
        self.session
            .as_mut()
            .ok_or_else(|| StrategyError::Protocol("engine process not started".to_string()))
    }

    fn shutdown(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.send("quit") {
                debug!(error = %e, "GTP quit failed");
            }
        }
        let deadline = Instant::now() + QUIT_TIMEOUT;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!(%status, "GTP engine exited");
                    return;
                }
                Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(50)),
                _ => break,
            }
        }
        warn!(program = %self.program, "GTP engine did not exit, killing it");
        let _ = child.kill();
        let _ = child.wait();
    }
}

impl Lifecycle for GtpPlayer {
    fn start_game(&mut self) -> Result<(), StrategyError> {
        self.shutdown();
        self.turn = Player::Black;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()?;
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(StrategyError::Protocol("engine pipes unavailable".to_string()));
        };
        self.child = Some(child);
        self.session = Some(GtpSession::new(BufReader::new(stdout), stdin));

        let size = self.board_size;
        let session = self.session()?;
        session.send(&format!("boardsize {size}"))?;
        session.send("clear_board")?;
        Ok(())
    }

    fn end_game(&mut self) -> Result<(), StrategyError> {
        self.shutdown();
        Ok(())
    }

    fn notify(&mut self, _board: &Board, action: usize) -> Result<(), StrategyError> {
        let command = format!("play {} {}", self.turn, action_to_move(action, self.board_size));
        self.session()?.send(&command)?;
        self.turn = self.turn.opponent();
        Ok(())
    }
}

impl Strategy for GtpPlayer {
    fn select_action(&mut self, _board: &Board) -> Result<usize, StrategyError> {
        let command = format!("genmove {}", self.turn);
        let reply = self.session()?.send(&command)?;
        self.turn = self.turn.opponent();
        move_to_action(&reply, self.board_size)
    }
}

impl Drop for GtpPlayer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
