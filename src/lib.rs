//! hax-rust: a Hex engine built on Monte Carlo Tree Search with RAVE.
//!
//! ## Modules
//!
//! - [`board`] - Hex board state: occupancy, turn order, legality
//! - [`oracle`] - Win detection: strict and two-bridge virtual connectivity
//! - [`tree`] - Cursor-navigated arena tree used by the search
//! - [`mcts`] - Per-worker select/expand/simulate/back-propagate loop
//! - [`pool`] - Fixed-size thread pool for root parallelization
//! - [`search`] - The public `monte_carlo_search` entry point
//! - [`render`] - Plain-text board rendering and move parsing for the CLI
//!
//! ## Example
//!
//! ```
//! use hax_rust::board::Board;
//! use hax_rust::search::monte_carlo_search;
//!
//! let board = Board::new(5).unwrap();
//! let best = monte_carlo_search(&board, 50, 2, 0.0, 1.0).unwrap();
//! assert!(best.is_some());
//! ```

pub mod board;
pub mod mcts;
pub mod oracle;
pub mod pool;
pub mod render;
pub mod search;
pub mod tree;
