use super::*;
use engine_core::{BLACK, WHITE};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn board_from_rows(rows: &[&str]) -> Board {
    let n = rows.len();
    let cells = rows
        .iter()
        .flat_map(|row| {
            row.chars().map(|ch| match ch {
                'O' => BLACK,
                'X' => WHITE,
                _ => EMPTY,
            })
        })
        .collect();
    Board::from_cells(n, cells).unwrap()
}

#[test]
fn test_initial_state() {
    let game = Territory::default();
    let board = game.initial_board();
    assert_eq!(board.size(), DEFAULT_SIZE);
    assert_eq!(board.count(EMPTY), 81);
    assert_eq!(game.action_size(), 82);
    assert_eq!(game.outcome(&board, Player::Black), Outcome::Ongoing);
    assert!(Territory::new(2).is_err());
}

#[test]
fn test_pass_never_legal() {
    let game = Territory::new(5).unwrap();
    let board = game.initial_board();
    let mask = game.legal_actions(&board, Player::Black);
    assert!(!mask.is_legal(game.pass_action()));
    assert_eq!(mask.count(), 25);

    let err = game
        .next_state(&board, Player::Black, game.pass_action())
        .unwrap_err();
    assert!(matches!(err, GameError::InvalidMove { .. }));
}

#[test]
fn test_occupied_cell_is_invalid() {
    let game = Territory::new(5).unwrap();
    let (board, next) = game.next_state(&game.initial_board(), Player::Black, 7).unwrap();
    assert_eq!(next, Player::White);
    assert_eq!(board.get(1, 2), BLACK);
    assert!(!game.legal_actions(&board, Player::White).is_legal(7));

    let err = game.next_state(&board, Player::White, 7).unwrap_err();
    assert!(matches!(err, GameError::InvalidMove { action: 7, .. }));
}

#[test]
fn test_full_board_goes_to_white() {
    let game = Territory::new(3).unwrap();
    let board = board_from_rows(&["OOO", "OXO", "OOO"]);
    assert_eq!(game.outcome(&board, Player::Black), Outcome::Loss);
    assert_eq!(game.outcome(&board, Player::White), Outcome::Win);
}

#[test]
fn test_settled_board_ends_with_black_win() {
    let game = Territory::new(5).unwrap();
    // Black owns the 3 interior cells; no neutral cell left.
    let board = board_from_rows(&["OOOOO", "O...O", "OOOOO", "XXXXX", "XXXXX"]);
    assert_eq!(score_territory(&board).neutral, 0);
    assert_eq!(game.outcome(&board, Player::Black), Outcome::Win);
    assert_eq!(game.outcome(&board, Player::White), Outcome::Loss);
    assert_eq!(game.score(&board, Player::Black), 3);
    assert_eq!(game.score(&board, Player::White), -3);
}

#[test]
fn test_neutral_cell_keeps_game_going() {
    let game = Territory::new(5).unwrap();
    let board = board_from_rows(&["OOOO.", "O...O", "OOOOO", "XXXXX", "XXXXX"]);
    assert_eq!(game.outcome(&board, Player::Black), Outcome::Ongoing);
}

#[test]
fn test_symmetries_identity_only() {
    let game = Territory::new(3).unwrap();
    let board = game.initial_board();
    let policy = vec![0.1; 10];
    let syms = game.symmetries(&board, &policy);
    assert_eq!(syms, vec![(board, policy)]);
}

#[test]
fn test_random_games_terminate_without_draws() {
    let game = Territory::new(5).unwrap();
    for seed in 0..20 {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut board = game.initial_board();
        let mut player = Player::Black;

        while !game.outcome(&board, player).is_terminal() {
            let legal: Vec<usize> = game.legal_actions(&board, player).legal_actions().collect();
            assert!(!legal.is_empty(), "seed={}", seed);
            let action = legal[rng.gen_range(0..legal.len())];
            let (next, next_player) = game.next_state(&board, player, action).unwrap();
            board = next;
            player = next_player;
        }

        let outcome = game.outcome(&board, player);
        assert_ne!(outcome, Outcome::Draw, "seed={}", seed);
        assert_eq!(outcome.flipped(), game.outcome(&board, player.opponent()));
    }
}
