//! Plain-text board rendering and move parsing for the CLI driver.
//!
//! Free functions only — no hidden game state. [`crate::board::Board`]
//! already implements [`std::fmt::Display`]; [`render`] just exposes that
//! under a name the CLI can call alongside [`parse_move`].

use crate::board::Board;

/// Render `board` as the indented text grid used by the CLI.
pub fn render(board: &Board) -> String {
    format!("{board}")
}

/// Parse a candidate move out of `input`.
///
/// Accepts a bare cell index (`"42"`) or a `column,row` pair (`"3,7"`, 0-based).
/// Returns `None` on anything that doesn't parse, regardless of legality —
/// the caller checks legality against the board.
pub fn parse_move(input: &str, board: &Board) -> Option<usize> {
    let input = input.trim();
    if let Some((col, row)) = input.split_once(',') {
        let col: usize = col.trim().parse().ok()?;
        let row: usize = row.trim().parse().ok()?;
        if col >= board.length() || row >= board.length() {
            return None;
        }
        return Some(row * board.length() + col);
    }
    let index: usize = input.parse().ok()?;
    if index >= board.area() {
        return None;
    }
    Some(index)
}
