//! Classify and solve a sudoku grid from the command line.
//!
//! # Usage
//!
//! ```sh
//! cargo run --example solve_grid -- \
//!     "4...3.......6..8..........1....5..9..8....6...7.2........1.27..5.3....4.9........"
//! ```
//!
//! The grid is 81 cells in row-major order; `1`-`9` are given clues and
//! `.`, `0`, or `_` mark empty cells. Whitespace is ignored, so the grid
//! may be split over multiple lines.

use std::process;

use clap::Parser;
use ninegrid_core::{Board, DigitGrid};
use ninegrid_solver::{Solutions, classify_with_stats};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// The 81-cell grid of given clues.
    grid: String,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let givens: DigitGrid = match args.grid.parse() {
        Ok(grid) => grid,
        Err(err) => {
            eprintln!("Invalid grid: {err}");
            process::exit(2);
        }
    };
    let board = Board::from_given_grid(&givens);

    let (solutions, stats) = classify_with_stats(&board);
    match solutions {
        Solutions::None => println!("No solution."),
        Solutions::Unique(solution) => {
            println!("Unique solution:");
            println!("  {solution}");
        }
        Solutions::Multiple => println!("Multiple solutions."),
    }

    println!();
    println!("Stats:");
    println!("  nodes visited: {}", stats.nodes_visited());
    println!("  backtracks: {}", stats.backtracks());
}
