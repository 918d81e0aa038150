//! Edit history and session management for the Ninegrid sudoku engine.
//!
//! This crate layers the reversible edit history on top of the
//! [`ninegrid_core`] board:
//!
//! - [`Command`]: a closed set of reversible edits, each capturing the
//!   prior state it needs to undo itself
//! - [`CommandStack`]: the ordered history with checkpoints, multi-step
//!   undo, and `<count>|tag|field|...` text serialization
//! - [`GameSession`]: the board + history pair the host application talks
//!   to, including the lazy solver invocation behind
//!   [`GameSession::solvability`] and the solver-assisted
//!   [`GameSession::undo_to_solvable_state`]
//!
//! # Examples
//!
//! ```
//! use ninegrid_core::{Board, Digit, Position};
//! use ninegrid_game::{Command, GameSession};
//!
//! let mut session = GameSession::new(Board::new());
//! session
//!     .apply(Command::set_value(Position::new(0, 0), Some(Digit::D5)))
//!     .unwrap();
//! session.set_checkpoint();
//! session
//!     .apply(Command::set_value(Position::new(0, 1), Some(Digit::D3)))
//!     .unwrap();
//!
//! session.undo_to_checkpoint();
//! assert_eq!(
//!     session.board().cell(Position::new(0, 0)).value(),
//!     Some(Digit::D5)
//! );
//! assert!(session.board().cell(Position::new(0, 1)).is_empty());
//! ```

pub use self::{
    command::{Command, ParseHistoryError, SavedCenterNote, SavedNotes},
    history::CommandStack,
    session::{GameSession, SessionError},
};

mod command;
mod history;
mod session;
