//! Exact-cover solver for the Ninegrid sudoku engine.
//!
//! A 9×9 board maps to an exact-cover problem with 324 constraints and 729
//! candidate placements; this crate builds the toroidal doubly-linked
//! structure of Knuth's Dancing Links and runs an Algorithm X search over
//! it. The public entry point, [`classify`], answers the only question the
//! engine asks: does the board's set of given clues admit zero, exactly
//! one, or more than one solution — and when unique, what is it.
//!
//! The solver is a pure, re-entrant computation: it builds its own private
//! constraint graph per call, performs no I/O, and holds no state after
//! returning, so callers may offload it to a worker thread freely.
//!
//! # Examples
//!
//! ```
//! use ninegrid_core::Board;
//! use ninegrid_solver::{Solutions, classify};
//!
//! // No givens: anything goes.
//! assert_eq!(classify(&Board::new()), Solutions::Multiple);
//! ```

pub use self::solver::{Solutions, SolverStats, classify, classify_with_stats};

mod matrix;
mod solver;
