//! Flood-fill territory scoring.
//!
//! An empty region counts as territory for a colour when it is bordered only
//! by that colour and does not touch the board edge. Regions touching the
//! edge or both colours are neutral.

use std::collections::VecDeque;

use engine_core::{Board, BLACK, EMPTY, WHITE};

/// Territory margin Black needs to win.
pub const BLACK_MARGIN: i32 = 3;

/// Territory totals of one board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerritoryScore {
    pub black: usize,
    pub white: usize,
    /// Empty cells not owned by either side.
    pub neutral: usize,
}

impl TerritoryScore {
    /// Black territory minus white territory.
    pub fn margin(&self) -> i32 {
        self.black as i32 - self.white as i32
    }
}

/// Count territory by flood-filling every empty region.
pub fn score_territory(board: &Board) -> TerritoryScore {
    let n = board.size();
    let mut visited = vec![false; n * n];
    let mut score = TerritoryScore::default();
    let on_edge = |r: usize, c: usize| r == 0 || c == 0 || r == n - 1 || c == n - 1;

    for start in 0..n * n {
        if visited[start] || board.cells()[start] != EMPTY {
            continue;
        }

        let mut queue = VecDeque::from([start]);
        visited[start] = true;
        let mut region = 0usize;
        let mut touches_edge = false;
        let mut touches_black = false;
        let mut touches_white = false;

        while let Some(idx) = queue.pop_front() {
            let (r, c) = (idx / n, idx % n);
            region += 1;
            touches_edge |= on_edge(r, c);

            let mut neighbours = [None; 4];
            if r > 0 {
                neighbours[0] = Some(idx - n);
            }
            if r + 1 < n {
                neighbours[1] = Some(idx + n);
            }
            if c > 0 {
                neighbours[2] = Some(idx - 1);
            }
            if c + 1 < n {
                neighbours[3] = Some(idx + 1);
            }

            for next in neighbours.into_iter().flatten() {
                match board.cells()[next] {
                    EMPTY if !visited[next] => {
                        visited[next] = true;
                        queue.push_back(next);
                    }
                    BLACK => touches_black = true,
                    WHITE => touches_white = true,
                    _ => {}
                }
            }
        }

        match (touches_edge, touches_black, touches_white) {
            (false, true, false) => score.black += region,
            (false, false, true) => score.white += region,
            _ => score.neutral += region,
        }
    }

    score
}

/// Winning colour: `BLACK` if its territory margin reaches `BLACK_MARGIN`,
/// otherwise `WHITE`. There are no draws.
pub fn winner_by_margin(board: &Board) -> i8 {
    if score_territory(board).margin() >= BLACK_MARGIN {
        BLACK
    } else {
        WHITE
    }
}
