//! Match bookkeeping with deterministic strategies.

use std::cell::RefCell;
use std::rc::Rc;

use arena::{Arena, ArenaError, GreedyPlayer, Lifecycle, Strategy, StrategyError};
use engine_core::{Board, Game, Outcome, Player};
use games_othello::Othello;
use games_territory::Territory;

/// Plays the lowest legal action and records every hook call.
struct FirstLegal<'g, G: Game> {
    game: &'g G,
    log: Rc<RefCell<Vec<String>>>,
}

impl<'g, G: Game> FirstLegal<'g, G> {
    fn new(game: &'g G) -> Self {
        Self {
            game,
            log: Rc::default(),
        }
    }
}

impl<G: Game> Lifecycle for FirstLegal<'_, G> {
    fn start_game(&mut self) -> Result<(), StrategyError> {
        self.log.borrow_mut().push("start".into());
        Ok(())
    }

    fn end_game(&mut self) -> Result<(), StrategyError> {
        self.log.borrow_mut().push("end".into());
        Ok(())
    }

    fn notify(&mut self, _board: &Board, action: usize) -> Result<(), StrategyError> {
        self.log.borrow_mut().push(format!("notify {action}"));
        Ok(())
    }
}

impl<G: Game> Strategy for FirstLegal<'_, G> {
    fn select_action(&mut self, board: &Board) -> Result<usize, StrategyError> {
        self.game
            .legal_actions(board, Player::Black)
            .legal_actions()
            .next()
            .ok_or(StrategyError::NoLegalMoves)
    }
}

/// Always answers with the same action.
struct Stubborn(usize);

impl Lifecycle for Stubborn {}

impl Strategy for Stubborn {
    fn select_action(&mut self, _board: &Board) -> Result<usize, StrategyError> {
        Ok(self.0)
    }
}

#[test]
fn test_match_is_symmetric_under_swapping_players() {
    let game = Othello::new(6).unwrap();
    let arena = Arena::new(&game);

    let mut greedy = GreedyPlayer::new(&game);
    let mut first = FirstLegal::new(&game);
    let forward = arena.play_match(&mut greedy, &mut first, 6).unwrap();

    let mut greedy = GreedyPlayer::new(&game);
    let mut first = FirstLegal::new(&game);
    let backward = arena.play_match(&mut first, &mut greedy, 6).unwrap();

    assert_eq!(forward, backward.swapped());
    assert_eq!(forward.games(), 6);
}

#[test]
fn test_halves_are_remapped_to_each_strategy() {
    let game = Territory::new(3).unwrap();
    let arena = Arena::new(&game);

    let mut a = FirstLegal::new(&game);
    let mut b = GreedyPlayer::new(&game);
    let a_first = arena.play_game(&mut a, &mut b).unwrap().outcome;
    let b_first = arena.play_game(&mut b, &mut a).unwrap().outcome;

    let result = arena.play_match(&mut a, &mut b, 4).unwrap();
    let mut expected = arena::MatchResult::default();
    for (outcome, a_moved_first) in [(a_first, true), (b_first, false)] {
        match (outcome, a_moved_first) {
            (Outcome::Win, true) | (Outcome::Loss, false) => expected.wins_a += 2,
            (Outcome::Loss, true) | (Outcome::Win, false) => expected.wins_b += 2,
            _ => expected.draws += 2,
        }
    }
    assert_eq!(result, expected);
    // Territory has no draws.
    assert_eq!(result.draws, 0);
}

#[test]
fn test_odd_game_counts_are_truncated() {
    let game = Territory::new(3).unwrap();
    let arena = Arena::new(&game);
    let mut a = FirstLegal::new(&game);
    let mut b = FirstLegal::new(&game);
    assert_eq!(arena.play_match(&mut a, &mut b, 5).unwrap().games(), 4);
    assert_eq!(arena.play_match(&mut a, &mut b, 1).unwrap().games(), 0);
}

#[test]
fn test_result_is_reported_for_the_first_mover() {
    let game = Territory::new(3).unwrap();
    let arena = Arena::new(&game);
    let mut a = FirstLegal::new(&game);
    let mut b = FirstLegal::new(&game);
    let result = arena.play_game(&mut a, &mut b).unwrap();

    // Both sides fill cells in index order, so the board ends full.
    assert!(result.final_board.is_full());
    assert_eq!(result.plies, 9);
    let final_player = if result.plies % 2 == 0 {
        Player::Black
    } else {
        Player::White
    };
    let direct = game.outcome(&result.final_board, final_player);
    let expected = match final_player {
        Player::Black => direct,
        Player::White => direct.flipped(),
    };
    assert_eq!(result.outcome, expected);
}

#[test]
fn test_hooks_see_every_game_and_opponent_move() {
    let game = Territory::new(3).unwrap();
    let arena = Arena::new(&game);
    let mut a = FirstLegal::new(&game);
    let mut b = FirstLegal::new(&game);
    let log_a = a.log.clone();
    let log_b = b.log.clone();

    let result = arena.play_game(&mut a, &mut b).unwrap();

    let log_a = log_a.borrow();
    let log_b = log_b.borrow();
    assert_eq!(log_a.first().map(String::as_str), Some("start"));
    assert_eq!(log_a.last().map(String::as_str), Some("end"));
    assert_eq!(log_b.last().map(String::as_str), Some("end"));
    let notified = log_a
        .iter()
        .chain(log_b.iter())
        .filter(|l| l.starts_with("notify"))
        .count();
    assert_eq!(notified as u32, result.plies);
    // Black's first move is relayed to White.
    assert_eq!(log_b[1], "notify 0");
}

#[test]
fn test_illegal_action_aborts_the_game() {
    let game = Othello::new(6).unwrap();
    let arena = Arena::new(&game);
    let mut cheater = Stubborn(0);
    let mut honest = FirstLegal::new(&game);
    let log = honest.log.clone();

    let err = arena.play_game(&mut cheater, &mut honest).unwrap_err();
    assert!(matches!(
        err,
        ArenaError::InvalidMove {
            player: Player::Black,
            action: 0
        }
    ));
    assert_eq!(log.borrow().as_slice(), ["start", "end"]);

    let mut honest = FirstLegal::new(&game);
    let mut cheater = Stubborn(14);
    let err = arena.play_match(&mut honest, &mut cheater, 2).unwrap_err();
    assert!(matches!(
        err,
        ArenaError::InvalidMove {
            player: Player::White,
            action: 14
        }
    ));
}

#[test]
fn test_empty_match_has_zero_rates() {
    let result = arena::MatchResult::default();
    assert_eq!(result.win_rate_a(), 0.0);
    assert_eq!(result.draw_rate(), 0.0);
    assert_eq!(result.decisive(), 0);
}
