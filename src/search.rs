//! Root-parallel Monte Carlo search: fan `n_threads` independent
//! [`mcts::search`] trees out across a [`pool::Pool`], then merge them by
//! summing root-child visit counts.
//!
//! Ported from `examples/original_source/Hax/search.cpp`'s
//! `MonteCarloSearch`, which builds one `GameTree` per thread, submits one
//! `_MonteCarloSearch` closure per tree to its thread pool, waits, and picks
//! the legal move with the highest summed visit count across trees.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::board::Board;
use crate::mcts::{self, NodeStats};
use crate::pool::{Pool, PoolError};
use crate::tree::Tree;

/// Run `n_threads` independent searches against copies of `board` for
/// `max_time_millis` each, and return the legal move with the highest
/// summed root-child visit count across all trees.
///
/// Returns `Ok(None)` if `board` has no legal moves. Returns `Err` if a
/// worker thread failed to spawn; per the spec's resource-error policy, the
/// other workers' partial trees are discarded rather than used.
pub fn monte_carlo_search(
    board: &Board,
    max_time_millis: i64,
    n_threads: usize,
    exp_bias: f64,
    b: f64,
) -> Result<Option<usize>, PoolError> {
    monte_carlo_search_verbose(board, max_time_millis, n_threads, exp_bias, b, false)
}

/// As [`monte_carlo_search`], but with `eprintln!` progress reporting when
/// `verbose` is set: one line per worker as it finishes, one line for the
/// chosen move.
pub fn monte_carlo_search_verbose(
    board: &Board,
    max_time_millis: i64,
    n_threads: usize,
    exp_bias: f64,
    b: f64,
    verbose: bool,
) -> Result<Option<usize>, PoolError> {
    let scores: Arc<Mutex<BTreeMap<usize, f64>>> = Arc::new(Mutex::new(
        (0..board.area()).filter(|&i| board.is_legal_move(i)).map(|i| (i, 0.0)).collect(),
    ));

    if scores.lock().unwrap().is_empty() {
        return Ok(None);
    }

    let pool = Pool::new(n_threads);
    for worker in 0..n_threads {
        let board = board.clone();
        let scores = Arc::clone(&scores);
        pool.submit(move || {
            let mut tree: Tree<NodeStats> = Tree::new(NodeStats::default());
            let mut board = board;
            let mut rng = fastrand::Rng::new();
            mcts::search(&mut tree, &mut board, max_time_millis, exp_bias, b, &mut rng);

            if verbose {
                eprintln!("worker {worker}: {} root iterations", tree.data().n);
            }

            let mut scores = scores.lock().unwrap();
            for (&mv, score) in scores.iter_mut() {
                if tree.has_child(mv) {
                    *score += tree.child(mv).n;
                }
            }
        })?;
    }
    drop(pool);

    let scores = scores.lock().unwrap();
    // `BTreeMap` iterates in ascending key order; fold manually (rather than
    // `Iterator::max_by`, which keeps the *last* of equal maxima) so ties are
    // broken by the first move encountered, per the spec's aggregation rule.
    let mut best: Option<(usize, f64)> = None;
    for (&mv, &visits) in scores.iter() {
        if best.is_none_or(|(_, best_visits)| visits > best_visits) {
            best = Some((mv, visits));
        }
    }
    let best = best.map(|(mv, _)| mv);

    if verbose {
        if let Some(mv) = best {
            eprintln!("chosen move: {mv} ({:.0} combined visits)", scores[&mv]);
        }
    }

    Ok(best)
}
