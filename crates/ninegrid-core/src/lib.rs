//! Core data model for the Ninegrid sudoku engine.
//!
//! This crate provides the board and cell data structures shared by the
//! solver and the edit history:
//!
//! - [`digit`]: type-safe digits 1-9
//! - [`position`]: board positions and peer navigation
//! - [`house`]: rows, columns, and boxes as non-owning views
//! - [`note`]: immutable candidate-digit notes
//! - [`cell`]: one board position's full state
//! - [`digit_grid`]: the value-only 81-cell grid
//! - [`board`]: the cell arena with validation, notes, change
//!   notification, and the solution cache
//! - [`serialize`]: the plain and versioned board text formats
//!
//! # Examples
//!
//! ```
//! use ninegrid_core::{Board, Digit, Position};
//!
//! let mut board = Board::deserialize(
//!     &"030000000".repeat(9),
//! )?;
//! assert!(!board.cell(Position::new(0, 1)).is_editable());
//! assert!(!board.validate()); // the column of 3s conflicts
//! # Ok::<(), ninegrid_core::ParseBoardError>(())
//! ```

pub mod board;
pub mod cell;
pub mod digit;
pub mod digit_grid;
pub mod house;
pub mod note;
pub mod position;
pub mod serialize;

pub use self::{
    board::{BatchGuard, Board, ChangeListener, Solvability},
    cell::Cell,
    digit::Digit,
    digit_grid::{DigitGrid, ParseDigitGridError},
    house::House,
    note::{NoteSet, ParseNoteError},
    position::Position,
    serialize::{BoardFormat, ParseBoardError},
};
