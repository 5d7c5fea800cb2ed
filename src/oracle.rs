//! Connection / win-detection oracle.
//!
//! Decides whether a player has connected their two home edges, either
//! strictly (stones only) or under the "two-bridge" virtual-connection
//! relaxation used to terminate MCTS playouts early. See
//! `examples/original_source/Hax/pathfinding.cpp` for the C++ original this
//! module is ported from.

use crate::board::{Board, Cell};

/// The outcome of [`check_win_state`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WinState {
    Ongoing,
    White,
    Black,
}

/// Six neighbor offsets `(dcol, drow)`, used uniformly by strict and virtual
/// traversal.
const NEIGHBOR_OFFSETS: [(isize, isize); 6] =
    [(-1, 0), (-1, 1), (0, 1), (0, -1), (1, 0), (1, -1)];

/// Two-bridge virtual offsets, paired with their two carrier offsets in the
/// fixed order from the spec's table.
const VIRTUAL_OFFSETS: [(isize, isize); 6] =
    [(1, 1), (2, -1), (1, -2), (-1, -1), (-2, 1), (-1, 2)];
const CARRIER_ONE: [(isize, isize); 6] = [(0, 1), (1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1)];
const CARRIER_TWO: [(isize, isize); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

/// Reusable scratch buffer for the connectivity flood.
///
/// Passing this explicitly (rather than allocating per call) is what lets
/// [`check_win_state`] run thousands of times per second inside MCTS
/// playouts without repeatedly touching the allocator.
pub struct Scratch {
    visited: Vec<bool>,
}

impl Scratch {
    pub fn new(area: usize) -> Self {
        Scratch {
            visited: vec![false; area],
        }
    }

    fn reset(&mut self, area: usize) {
        if self.visited.len() != area {
            self.visited = vec![false; area];
        } else {
            self.visited.iter_mut().for_each(|v| *v = false);
        }
    }
}

fn is_player_color(white: bool, cell: Cell) -> bool {
    match cell {
        Cell::White => white,
        Cell::Black => !white,
        Cell::Unoccupied => false,
    }
}

fn direct_goal(board: &Board, pos: usize, white: bool) -> bool {
    if white {
        board.row(pos) == board.length() - 1
    } else {
        board.col(pos) == board.length() - 1
    }
}

fn virtual_goal(board: &Board, pos: usize, white: bool) -> bool {
    if direct_goal(board, pos, white) {
        return true;
    }
    let l = board.length();
    if white {
        board.row(pos) == l - 2
            && board.col(pos) > 0
            && board
                .translate(pos, 0, 1)
                .is_some_and(|c| board.is_legal_move(c))
            && board
                .translate(pos, -1, 1)
                .is_some_and(|c| board.is_legal_move(c))
    } else {
        board.col(pos) == l - 2
            && board.row(pos) > 0
            && board
                .translate(pos, 1, 0)
                .is_some_and(|c| board.is_legal_move(c))
            && board
                .translate(pos, 1, -1)
                .is_some_and(|c| board.is_legal_move(c))
    }
}

/// Depth-first flood from `pos`, returning true as soon as a goal cell is
/// reached. Visits only `white`-colored (or Black-colored) cells.
fn has_path(board: &Board, pos: usize, white: bool, include_virtual: bool, visited: &mut [bool]) -> bool {
    if visited[pos] || !is_player_color(white, board[pos]) {
        return false;
    }
    visited[pos] = true;

    let goal = if include_virtual {
        virtual_goal(board, pos, white)
    } else {
        direct_goal(board, pos, white)
    };
    if goal {
        return true;
    }

    let mut neighbors: [Option<usize>; 12] = [None; 12];
    for (i, &(dc, dr)) in NEIGHBOR_OFFSETS.iter().enumerate() {
        neighbors[i] = board.translate(pos, dc, dr);
    }

    if include_virtual {
        for i in 0..6 {
            let Some(target) = board.translate(pos, VIRTUAL_OFFSETS[i].0, VIRTUAL_OFFSETS[i].1) else {
                continue;
            };
            let b1 = board.translate(pos, CARRIER_ONE[i].0, CARRIER_ONE[i].1);
            let b2 = board.translate(pos, CARRIER_TWO[i].0, CARRIER_TWO[i].1);
            let blocked = !matches!(b1, Some(c) if board.is_legal_move(c))
                || !matches!(b2, Some(c) if board.is_legal_move(c));
            if !blocked {
                neighbors[i + 6] = Some(target);
            }
        }
    }

    for n in neighbors.into_iter().flatten() {
        if is_player_color(white, board[n]) && has_path(board, n, white, include_virtual, visited) {
            return true;
        }
    }

    false
}

/// Seed the flood from cells one step interior to the home edge whose
/// carriers to the edge are both empty (virtual mode only).
fn init_virtual_search(board: &Board, white: bool, visited: &mut [bool]) -> bool {
    let l = board.length();
    if white {
        for col in 1..l.saturating_sub(1) {
            let pos = l + col;
            let b1 = board.translate(pos, 0, -1);
            let b2 = board.translate(pos, 1, -1);
            let blocked = !matches!(b1, Some(c) if board.is_legal_move(c))
                || !matches!(b2, Some(c) if board.is_legal_move(c));
            if !blocked && has_path(board, pos, true, true, visited) {
                return true;
            }
        }
    } else {
        for row in 1..l.saturating_sub(1) {
            let pos = row * l + 1;
            let b1 = board.translate(pos, -1, 0);
            let b2 = board.translate(pos, -1, 1);
            let blocked = !matches!(b1, Some(c) if board.is_legal_move(c))
                || !matches!(b2, Some(c) if board.is_legal_move(c));
            if !blocked && has_path(board, pos, false, true, visited) {
                return true;
            }
        }
    }
    false
}

fn init_search(board: &Board, white: bool, include_virtual: bool, visited: &mut [bool]) -> bool {
    let l = board.length();
    if white {
        for col in 0..l {
            if has_path(board, col, true, include_virtual, visited) {
                return true;
            }
        }
    } else {
        for row in 0..l {
            if has_path(board, row * l, false, include_virtual, visited) {
                return true;
            }
        }
    }

    if include_virtual {
        return init_virtual_search(board, white, visited);
    }

    false
}

/// Decide whether either player has connected their home edges.
///
/// Only the side that just moved is tested, since no other move could have
/// completed a connection. Below the minimum stone threshold for the
/// requested mode, returns `Ongoing` without searching. Total: never fails,
/// never mutates `board`.
pub fn check_win_state(board: &Board, include_virtual: bool) -> WinState {
    let mut scratch = Scratch::new(board.area());
    check_win_state_scratch(board, include_virtual, &mut scratch)
}

/// As [`check_win_state`], but reusing a caller-provided [`Scratch`] buffer
/// to avoid per-call allocation. This is the entry point MCTS playouts use.
pub fn check_win_state_scratch(
    board: &Board,
    include_virtual: bool,
    scratch: &mut Scratch,
) -> WinState {
    let min_to_check = if include_virtual {
        board.length()
    } else {
        2 * board.length() - 1
    };
    if board.count_occupied() < min_to_check {
        return WinState::Ongoing;
    }

    // Not white to move means white just moved, so test white's connection.
    let white = !board.white_to_move();
    scratch.reset(board.area());
    let has_win = init_search(board, white, include_virtual, &mut scratch.visited);

    match (white, has_win) {
        (true, true) => WinState::White,
        (false, true) => WinState::Black,
        _ => WinState::Ongoing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_pairs(board: &mut Board, whites: &[usize], blacks: &[usize]) {
        for (&w, &b) in whites.iter().zip(blacks.iter()) {
            board.make_move(w);
            board.make_move(b);
        }
    }

    #[test]
    fn empty_board_is_ongoing() {
        for l in [1, 5, 10, 20] {
            let board = Board::new(l).unwrap();
            assert_eq!(check_win_state(&board, false), WinState::Ongoing);
            assert_eq!(check_win_state(&board, true), WinState::Ongoing);
        }
    }

    /// S1: trivial black win on a 10x10 board.
    #[test]
    fn s1_trivial_black_win() {
        let mut board = Board::new(10).unwrap();
        for i in 0..10 {
            board.make_move(99 - i);
            board.make_move(i);
        }
        assert_eq!(check_win_state(&board, false), WinState::Black);
    }

    /// S2: direct white win via a "trickier" fixture.
    #[test]
    fn s2_direct_white_win() {
        let whites = [
            0, 1, 2, 3, 4, 13, 16, 17, 22, 25, 27, 32, 33, 34, 36, 37, 45, 51, 52, 53, 54, 56, 57,
            58, 61, 65, 68, 71, 72, 73, 74, 76, 77, 78, 85, 95,
        ];
        let blacks = [
            5, 6, 7, 8, 9, 10, 11, 12, 14, 15, 18, 19, 20, 21, 23, 24, 26, 28, 29, 30, 31, 35, 38,
            39, 40, 41, 42, 43, 44, 46, 47, 48, 49, 97, 98, 99,
        ];
        let mut board = Board::new(10).unwrap();
        play_pairs(&mut board, &whites, &blacks);
        board.make_move(96);
        assert_eq!(check_win_state(&board, false), WinState::White);
    }

    /// S3: virtual white win, downgraded to Ongoing once a bridge is blocked.
    #[test]
    fn s3_virtual_white_win_then_blocked() {
        let whites = [4, 23, 42, 61, 72];
        let blacks = [9, 19, 29, 39, 49];
        let mut board = Board::new(10).unwrap();
        play_pairs(&mut board, &whites, &blacks);
        board.make_move(91);
        assert_eq!(check_win_state(&board, true), WinState::White);

        board.make_move(13);
        board.make_move(16);
        assert_eq!(check_win_state(&board, true), WinState::Ongoing);
    }

    /// S4: disconnected virtual edges, still a virtual win until blocked.
    #[test]
    fn s4_disconnected_virtual_edges() {
        let whites = [14, 33, 52, 71];
        let blacks = [9, 19, 29, 39];
        let mut board = Board::new(10).unwrap();
        play_pairs(&mut board, &whites, &blacks);
        board.make_move(82);
        assert_eq!(check_win_state(&board, true), WinState::White);

        board.make_move(24);
        board.make_move(16);
        assert_eq!(check_win_state(&board, true), WinState::Ongoing);
    }

    /// S5: virtual mode finds a connection strict mode does not.
    #[test]
    fn s5_virtual_differs_from_strict() {
        let whites = [
            13, 18, 26, 32, 34, 36, 43, 47, 48, 54, 58, 74, 76, 78,
        ];
        let blacks = [
            7, 15, 24, 25, 33, 35, 42, 45, 51, 56, 57, 67, 68, 77,
        ];
        let mut board = Board::new(10).unwrap();
        play_pairs(&mut board, &whites, &blacks);
        assert_eq!(check_win_state(&board, true), WinState::Black);
        assert_eq!(check_win_state(&board, false), WinState::Ongoing);
    }

    #[test]
    fn virtual_monotone_over_strict() {
        // S2's fixture is a strict win; virtual mode must agree.
        let whites = [
            0, 1, 2, 3, 4, 13, 16, 17, 22, 25, 27, 32, 33, 34, 36, 37, 45, 51, 52, 53, 54, 56, 57,
            58, 61, 65, 68, 71, 72, 73, 74, 76, 77, 78, 85, 95,
        ];
        let blacks = [
            5, 6, 7, 8, 9, 10, 11, 12, 14, 15, 18, 19, 20, 21, 23, 24, 26, 28, 29, 30, 31, 35, 38,
            39, 40, 41, 42, 43, 44, 46, 47, 48, 49, 97, 98, 99,
        ];
        let mut board = Board::new(10).unwrap();
        play_pairs(&mut board, &whites, &blacks);
        board.make_move(96);
        let strict = check_win_state(&board, false);
        assert_eq!(strict, WinState::White);
        assert_eq!(check_win_state(&board, true), strict);
    }

    #[test]
    fn rotation_symmetry_swaps_colors() {
        // A 4x4 board where Black connects left-to-right directly.
        let mut board = Board::new(4).unwrap();
        // White plays filler moves that don't interfere, Black plays column 0..3 of row 0.
        let blacks = [0, 1, 2, 3];
        let whites = [4, 5, 6]; // irrelevant filler, enough stones for threshold
        for i in 0..3 {
            board.make_move(whites[i]);
            board.make_move(blacks[i]);
        }
        board.make_move(8); // white filler to let black play last black cell
        board.make_move(blacks[3]);
        assert_eq!(check_win_state(&board, false), WinState::Black);

        // Rotate 90°: (row, col) -> (col, L-1-row), and swap White/Black.
        // The rotated board has White connecting top-to-bottom where Black did
        // left-to-right, which is exactly White's own home-edge goal.
        let l = 4;
        let mut rotated = Board::new(l).unwrap();
        let mut placements = vec![None; 16];
        for idx in 0..16 {
            let r = idx / l;
            let c = idx % l;
            let cell = board[idx];
            if cell == Cell::Unoccupied {
                continue;
            }
            let nr = c;
            let nc = l - 1 - r;
            let swapped = match cell {
                Cell::White => Cell::Black,
                Cell::Black => Cell::White,
                Cell::Unoccupied => unreachable!(),
            };
            placements[nr * l + nc] = Some(swapped);
        }
        // Replay in an order consistent with whoever moves first: just force
        // placements directly via make_move/undo-free construction using the
        // turn flag trick (both colors get same move counts here).
        let mut order: Vec<usize> = (0..16).filter(|&i| placements[i].is_some()).collect();
        order.sort_by_key(|&i| match placements[i].unwrap() {
            Cell::White => 0,
            Cell::Black => 1,
            Cell::Unoccupied => 2,
        });
        // Interleave so make_move's implicit turn alternation matches the
        // recorded color at each index.
        let whites_r: Vec<usize> = order
            .iter()
            .copied()
            .filter(|&i| placements[i] == Some(Cell::White))
            .collect();
        let blacks_r: Vec<usize> = order
            .iter()
            .copied()
            .filter(|&i| placements[i] == Some(Cell::Black))
            .collect();
        for i in 0..whites_r.len().max(blacks_r.len()) {
            if let Some(&w) = whites_r.get(i) {
                rotated.make_move(w);
            }
            if let Some(&b) = blacks_r.get(i) {
                rotated.make_move(b);
            }
        }
        assert_eq!(check_win_state(&rotated, false), WinState::White);
    }

    #[test]
    fn blocking_a_bridge_downgrades_virtual_win() {
        let whites = [4, 23, 42, 61, 72];
        let blacks = [9, 19, 29, 39, 49];
        let mut board = Board::new(10).unwrap();
        play_pairs(&mut board, &whites, &blacks);
        board.make_move(91);
        assert_eq!(check_win_state(&board, true), WinState::White);
        board.make_move(13);
        board.make_move(16);
        assert_eq!(check_win_state(&board, true), WinState::Ongoing);
    }
}
