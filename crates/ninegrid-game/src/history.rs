//! The edit-history command stack.

use std::fmt::Write as _;

use log::debug;
use ninegrid_core::{Board, Position, Solvability};

use crate::command::{Command, ParseHistoryError, Tokens};

/// An ordered stack of executed commands bound to one board.
///
/// Commands push on execution and pop on undo; a popped command is never
/// re-executed (there is no redo). The stack is rebuilt empty whenever the
/// board it targets is replaced.
///
/// # Examples
///
/// ```
/// use ninegrid_core::{Board, Digit, Position};
/// use ninegrid_game::{Command, CommandStack};
///
/// let mut board = Board::new();
/// let mut history = CommandStack::new();
///
/// history.execute(
///     Command::set_value(Position::new(0, 0), Some(Digit::D5)),
///     &mut board,
/// );
/// board.validate();
///
/// assert!(history.undo(&mut board));
/// assert!(board.cell(Position::new(0, 0)).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandStack {
    commands: Vec<Command>,
}

impl CommandStack {
    /// Creates an empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Returns `true` while no command is on the stack.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Returns the number of commands on the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if [`CommandStack::undo`] would undo something.
    #[must_use]
    pub fn has_something_to_undo(&self) -> bool {
        !self.commands.is_empty()
    }

    /// Executes `command` against `board` and pushes it.
    ///
    /// The caller runs `board.validate()` afterwards; commands never
    /// validate themselves.
    pub fn execute(&mut self, mut command: Command, board: &mut Board) {
        command.execute(board);
        self.commands.push(command);
    }

    /// Pops and undoes the top command, then re-validates the board.
    ///
    /// Returns `false` (a safe no-op) on an empty stack.
    pub fn undo(&mut self, board: &mut Board) -> bool {
        let Some(command) = self.commands.pop() else {
            return false;
        };
        command.undo(board);
        board.validate();
        true
    }

    /// Pushes a checkpoint marker, unless the top of the stack already is
    /// one.
    pub fn set_checkpoint(&mut self) {
        if matches!(self.commands.last(), Some(command) if command.is_checkpoint()) {
            return;
        }
        self.commands.push(Command::checkpoint());
    }

    /// Returns `true` if a checkpoint marker is anywhere on the stack.
    /// Scan-only, never mutates.
    #[must_use]
    pub fn has_checkpoint(&self) -> bool {
        self.commands.iter().any(Command::is_checkpoint)
    }

    /// Pops and undoes until a checkpoint marker is popped (inclusive) or
    /// the stack empties, then validates once.
    pub fn undo_to_checkpoint(&mut self, board: &mut Board) {
        let mut undone = 0;
        let mut batch = board.batch();
        while let Some(command) = self.commands.pop() {
            if command.is_checkpoint() {
                break;
            }
            command.undo(&mut batch);
            undone += 1;
        }
        batch.validate();
        drop(batch);
        debug!("undo to checkpoint reverted {undone} commands");
    }

    /// Pops and undoes while any filled cell disagrees with the cached
    /// unique solution, then validates once. Returns the number of popped
    /// commands.
    ///
    /// Stops as soon as no mismatch remains, so correct moves made before
    /// the first mistake survive.
    ///
    /// # Panics
    ///
    /// Panics unless `board.solvability()` is [`Solvability::Unique`]; the
    /// caller must classify the board first.
    pub fn undo_to_solvable_state(&mut self, board: &mut Board) -> usize {
        assert!(
            board.solvability() == Solvability::Unique,
            "undo to solvable state requires a cached unique solution, \
             but solvability is {:?}",
            board.solvability(),
        );
        let mut undone = 0;
        let mut batch = board.batch();
        while has_solution_mismatch(&batch) {
            let Some(command) = self.commands.pop() else {
                break;
            };
            command.undo(&mut batch);
            undone += 1;
        }
        batch.validate();
        drop(batch);
        debug!("undo to solvable state reverted {undone} commands");
        undone
    }

    /// Returns the cell touched by the most recent single-cell command,
    /// for restoring UI focus.
    #[must_use]
    pub fn last_changed_cell(&self) -> Option<Position> {
        self.commands.iter().rev().find_map(Command::target_cell)
    }

    /// Serializes the stack as `<count>|` followed by each command,
    /// bottom of the stack first.
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "{}|", self.commands.len());
        for command in &self.commands {
            command.write_to(&mut out);
        }
        out
    }

    /// Reconstructs a stack from its serialized form.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseHistoryError`] on an unknown command tag, a
    /// malformed field, or a token count that disagrees with the announced
    /// command count.
    pub fn deserialize(text: &str) -> Result<Self, ParseHistoryError> {
        let mut tokens = Tokens::new(text);
        let count_token = tokens.next()?;
        let count =
            count_token
                .parse::<usize>()
                .map_err(|_| ParseHistoryError::InvalidField {
                    token: count_token.to_owned(),
                })?;
        let mut commands = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            commands.push(Command::read_from(&mut tokens)?);
        }
        tokens.finish(count)?;
        Ok(Self { commands })
    }
}

fn has_solution_mismatch(board: &Board) -> bool {
    Position::ALL.into_iter().any(|pos| {
        let cell = board.cell(pos);
        cell.value().is_some() && !cell.matches_solution()
    })
}
