//! hax-rust: play Hex against an MCTS+RAVE engine from the terminal.
//!
//! Alternates an engine move (via [`hax_rust::search::monte_carlo_search`])
//! with a human move read from stdin, rendering the board between turns.
//! Re-implements `examples/original_source/Engine/main.cpp`'s loop natively,
//! in the `clap::Parser` style of `examples/gyk-michi-rust/src/main.rs`.

use std::io::{self, Write};

use clap::Parser;

use hax_rust::board::Board;
use hax_rust::oracle::{check_win_state, WinState};
use hax_rust::render::{parse_move, render};
use hax_rust::search::monte_carlo_search_verbose;

/// Play Hex against an MCTS engine.
#[derive(Parser)]
#[command(name = "hax-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Board side length (1..=20).
    #[arg(short = 'l', long, default_value_t = 11)]
    length: usize,

    /// Per-move search budget in milliseconds.
    #[arg(short = 't', long, default_value_t = 5000)]
    time: i64,

    /// Number of root-parallel search workers.
    #[arg(short = 'j', long, default_value_t = 4)]
    threads: usize,

    /// UCB1 exploration constant.
    #[arg(long, default_value_t = 0.0)]
    exp_bias: f64,

    /// RAVE bias parameter.
    #[arg(short = 'b', long, default_value_t = 1.0)]
    bias: f64,

    /// Let the human play White (moves first) instead of Black.
    #[arg(long)]
    human_white: bool,
}

fn main() {
    let cli = Cli::parse();

    let board = match Board::new(cli.length) {
        Ok(board) => board,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    run_game(board, &cli);
}

fn run_game(mut board: Board, cli: &Cli) {
    println!("hax-rust: a {0}x{0} game of Hex.", cli.length);
    println!(
        "White connects top-to-bottom, Black connects left-to-right. You are {}.",
        if cli.human_white { "White" } else { "Black" }
    );

    loop {
        println!("{}", render(&board));

        if check_win_state(&board, false) != WinState::Ongoing {
            break;
        }

        let humans_turn = board.white_to_move() == cli.human_white;
        if humans_turn {
            let Some(mv) = prompt_human_move(&board) else {
                println!("No legal moves remain.");
                break;
            };
            board.make_move(mv);
        } else {
            let result = monte_carlo_search_verbose(
                &board,
                cli.time,
                cli.threads,
                cli.exp_bias,
                cli.bias,
                true,
            );
            let mv = match result {
                Ok(Some(mv)) => mv,
                Ok(None) => {
                    println!("No legal moves remain.");
                    break;
                }
                Err(err) => {
                    eprintln!("error: {err}");
                    break;
                }
            };
            println!("Computer plays: {mv}");
            board.make_move(mv);
        }
    }

    println!("{}", render(&board));
    match check_win_state(&board, false) {
        WinState::White => println!("White wins!"),
        WinState::Black => println!("Black wins!"),
        WinState::Ongoing => println!("Game over (no legal moves remain)."),
    }
}

/// Read a legal move index from stdin, re-prompting on anything else.
/// Returns `None` if the board has no legal moves at all.
fn prompt_human_move(board: &Board) -> Option<usize> {
    if board.count_unoccupied() == 0 {
        return None;
    }
    loop {
        print!("Enter a move (cell index, or \"col,row\"): ");
        io::stdout().flush().ok();

        let mut line = String::new();
        if io::stdin().read_line(&mut line).unwrap_or(0) == 0 {
            return None;
        }

        match parse_move(&line, board) {
            Some(mv) if board.is_legal_move(mv) => return Some(mv),
            _ => println!("Not a legal move, try again."),
        }
    }
}
