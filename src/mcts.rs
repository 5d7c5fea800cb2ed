//! Monte Carlo Tree Search with RAVE — the four-phase loop a single worker
//! runs against its own [`Tree`] and a private [`Board`] copy.
//!
//! Ported from `examples/original_source/Hax/search.cpp`'s
//! `_MonteCarloSearch`, generalizing its UCB1-RAVE node selection
//! (`_Ucb`/`_Beta`) and its sibling-updating back-propagation walk. The
//! "shuffle, then walk a leaf-urgency tree" style of
//! `examples/gyk-michi-rust/src/mcts.rs` (`most_urgent`, `tree_descend`)
//! carries over as the idiom, even though the scoring formula and
//! termination predicate (two-bridge virtual connections, not a move-count
//! cap) are specific to Hex.

use std::collections::BTreeSet;
use std::time::Instant;

use crate::board::{Board, Cell};
use crate::oracle::{self, Scratch, WinState};
use crate::tree::Tree;

/// Per-edge statistics: playouts (`n`/`w`) and RAVE playouts (`nr`/`wr`).
#[derive(Copy, Clone, Debug, Default)]
pub struct NodeStats {
    pub n: f64,
    pub w: f64,
    pub nr: f64,
    pub wr: f64,
}

impl NodeStats {
    pub fn winrate(&self) -> f64 {
        if self.n > 0.0 {
            self.w / self.n
        } else {
            0.0
        }
    }
}

fn beta(n_i: f64, n_hat_i: f64, b: f64) -> f64 {
    n_hat_i / (n_i + n_hat_i + 4.0 * b * b * n_i * n_hat_i)
}

fn ucb(w_i: f64, n_i: f64, w_hat_i: f64, n_hat_i: f64, n_parent: f64, exp_bias: f64, b: f64) -> f64 {
    let beta = if n_hat_i > 0.0 { beta(n_i, n_hat_i, b) } else { 0.0 };
    let mc = (1.0 - beta) * (w_i / n_i) + exp_bias * (n_parent.ln() / n_i).sqrt();
    let rave = if n_hat_i > 0.0 { beta * (w_hat_i / n_hat_i) } else { 0.0 };
    mc + rave
}

/// Descend from the current cursor to an unvisited-or-leaf frontier,
/// following the highest-UCB child at each step. Stops as soon as a
/// candidate legal move has no child, or no legal moves remain.
fn select(
    tree: &mut Tree<NodeStats>,
    board: &mut Board,
    legal: &mut BTreeSet<usize>,
    move_hist: &mut Vec<usize>,
    exp_bias: f64,
    b: f64,
) {
    loop {
        let n_parent = tree.data().n;
        let mut has_unvisited = false;
        let mut best: Option<(f64, usize)> = None;

        for &i in legal.iter() {
            if !tree.has_child(i) {
                has_unvisited = true;
                break;
            }
            let node = tree.child(i);
            let score = ucb(node.w, node.n, node.wr, node.nr, n_parent, exp_bias, b);
            if best.is_none_or(|(best_score, _)| score > best_score) {
                best = Some((score, i));
            }
        }

        if has_unvisited || legal.is_empty() {
            return;
        }

        let (_, best_move) = best.expect("non-empty legal moves yield a best score");
        tree.descend(best_move);
        board.make_move(best_move);
        legal.remove(&best_move);
        move_hist.push(best_move);
    }
}

/// Insert a fresh child for a uniformly-chosen unvisited legal move, and
/// descend/play into it. A no-op if every legal move already has a child.
fn expand(
    tree: &mut Tree<NodeStats>,
    board: &mut Board,
    legal: &mut BTreeSet<usize>,
    move_hist: &mut Vec<usize>,
    rng: &mut fastrand::Rng,
) {
    let unvisited: Vec<usize> = legal.iter().copied().filter(|&i| !tree.has_child(i)).collect();
    if unvisited.is_empty() {
        return;
    }
    let mv = unvisited[rng.usize(..unvisited.len())];
    tree.insert(mv, NodeStats::default());
    tree.descend(mv);
    board.make_move(mv);
    legal.remove(&mv);
    move_hist.push(mv);
}

/// Play a uniformly shuffled order of the remaining legal moves, stopping
/// as soon as the virtual-connection oracle reports a winner.
fn playout(
    board: &mut Board,
    legal: &mut BTreeSet<usize>,
    move_hist: &mut Vec<usize>,
    rng: &mut fastrand::Rng,
    scratch: &mut Scratch,
) -> WinState {
    let mut order: Vec<usize> = legal.iter().copied().collect();
    rng.shuffle(&mut order);

    let mut idx = 0;
    loop {
        let state = oracle::check_win_state_scratch(board, true, scratch);
        if state != WinState::Ongoing {
            return state;
        }
        debug_assert!(idx < order.len(), "hex board filled with no winner");
        let mv = order[idx];
        idx += 1;
        board.make_move(mv);
        move_hist.push(mv);
        legal.remove(&mv);
    }
}

/// Walk the cursor back to the root, updating visit/win counts along the
/// path and RAVE counts for every sibling move that appears in
/// `move_hist` and was played by the matching side.
///
/// `white_to_move` must be the board's `white_to_move()` value captured at
/// the expanded leaf, before the playout ran.
fn backpropagate(
    tree: &mut Tree<NodeStats>,
    board: &Board,
    move_hist: &[usize],
    mut white_to_move: bool,
    winner: WinState,
) {
    let mut is_win_for_node = (white_to_move && winner == WinState::Black)
        || (!white_to_move && winner == WinState::White);

    while !tree.is_root() {
        {
            let node = tree.data_mut();
            node.n += 1.0;
            if is_win_for_node {
                node.w += 1.0;
            }
        }
        tree.ascend();

        for &m in move_hist {
            let is_mover_color = match board[m] {
                Cell::White => !white_to_move,
                Cell::Black => white_to_move,
                Cell::Unoccupied => false,
            };
            if is_mover_color && tree.has_child(m) {
                let child = tree.child_mut(m);
                child.nr += 1.0;
                if is_win_for_node {
                    child.wr += 1.0;
                }
            }
        }

        is_win_for_node = !is_win_for_node;
        white_to_move = !white_to_move;
    }

    tree.data_mut().n += 1.0;
}

/// Run one select/expand/simulate/back-propagate iteration against `tree`
/// and `board`, leaving both restored to their pre-iteration state except
/// for the accumulated statistics.
fn run_iteration(
    tree: &mut Tree<NodeStats>,
    board: &mut Board,
    legal: &mut BTreeSet<usize>,
    rng: &mut fastrand::Rng,
    scratch: &mut Scratch,
    exp_bias: f64,
    b: f64,
) {
    debug_assert_eq!(legal.len(), board.count_unoccupied(), "legal move set out of sync");

    let mut move_hist = Vec::new();

    select(tree, board, legal, &mut move_hist, exp_bias, b);
    expand(tree, board, legal, &mut move_hist, rng);

    let white_to_move = board.white_to_move();
    let winner = playout(board, legal, &mut move_hist, rng, scratch);

    backpropagate(tree, board, &move_hist, white_to_move, winner);

    for &m in &move_hist {
        board.undo_move(m);
        legal.insert(m);
    }
}

/// Run iterations against `tree`/`board` until `max_time_millis` of
/// wall-clock time has elapsed. `tree` is expected fresh (root only); the
/// caller owns `board` and `tree` for the duration of the call.
pub fn search(
    tree: &mut Tree<NodeStats>,
    board: &mut Board,
    max_time_millis: i64,
    exp_bias: f64,
    b: f64,
    rng: &mut fastrand::Rng,
) {
    let mut legal: BTreeSet<usize> = (0..board.area()).filter(|&i| board.is_legal_move(i)).collect();
    let mut scratch = Scratch::new(board.area());
    let budget = std::time::Duration::from_millis(max_time_millis.max(0) as u64);

    let mut elapsed = std::time::Duration::ZERO;
    while elapsed < budget {
        let start = Instant::now();
        run_iteration(tree, board, &mut legal, rng, &mut scratch, exp_bias, b);
        elapsed += start.elapsed();
    }
}
