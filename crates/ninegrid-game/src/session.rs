//! The game session: a board, its edit history, and solver glue.

use ninegrid_core::{Board, Position, Solvability};
use ninegrid_solver::Solutions;

use crate::{Command, CommandStack};

/// Errors returned when applying a command to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SessionError {
    /// The command targets a given (non-editable) cell.
    #[display("cell {pos} is not editable")]
    CellNotEditable {
        /// The rejected target cell.
        pos: Position,
    },
}

/// An active puzzle: the board plus the history of edits against it.
///
/// The session is the engine's outermost surface. It enforces the
/// editability policy, re-validates the board after every change, and
/// lazily invokes the exact-cover solver the first time solvability is
/// asked for (and again after the set of givens changes).
///
/// # Examples
///
/// ```
/// use ninegrid_core::{Board, Digit, Position, Solvability};
/// use ninegrid_game::{Command, GameSession};
///
/// let mut session = GameSession::new(Board::new());
/// session
///     .apply(Command::set_value(Position::new(0, 0), Some(Digit::D5)))
///     .unwrap();
///
/// // An empty board is solvable in many ways.
/// assert_eq!(session.solvability(), Solvability::Multiple);
///
/// assert!(session.undo());
/// assert!(session.board().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct GameSession {
    board: Board,
    history: CommandStack,
}

impl GameSession {
    /// Creates a session around `board` with an empty history.
    #[must_use]
    pub fn new(board: Board) -> Self {
        Self {
            board,
            history: CommandStack::new(),
        }
    }

    /// Returns the board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the board mutably, for listener registration and direct
    /// setup.
    ///
    /// Changes made here bypass the history; prefer [`GameSession::apply`]
    /// for player edits.
    pub const fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Returns the edit history.
    #[must_use]
    pub const fn history(&self) -> &CommandStack {
        &self.history
    }

    /// Replaces the board and empties the history.
    pub fn reset_board(&mut self, board: Board) {
        self.board = board;
        self.history = CommandStack::new();
    }

    /// Restores a history saved by [`CommandStack::serialize`].
    ///
    /// The commands are assumed to have been executed against the current
    /// board state in a past session.
    pub fn restore_history(&mut self, history: CommandStack) {
        self.history = history;
    }

    /// Executes a player command, records it, and re-validates the board.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::CellNotEditable`] when a single-cell command
    /// targets a given cell; the board is left untouched.
    pub fn apply(&mut self, command: Command) -> Result<(), SessionError> {
        if let Some(pos) = command.target_cell()
            && !self.board.cell(pos).is_editable()
        {
            return Err(SessionError::CellNotEditable { pos });
        }
        self.history.execute(command, &mut self.board);
        self.board.validate();
        Ok(())
    }

    /// Undoes the most recent command. Safe no-op on an empty history.
    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.board)
    }

    /// Returns `true` if [`GameSession::undo`] would undo something.
    #[must_use]
    pub fn has_something_to_undo(&self) -> bool {
        self.history.has_something_to_undo()
    }

    /// Marks the current position in the history.
    pub fn set_checkpoint(&mut self) {
        self.history.set_checkpoint();
    }

    /// Returns `true` if a checkpoint is on the stack.
    #[must_use]
    pub fn has_checkpoint(&self) -> bool {
        self.history.has_checkpoint()
    }

    /// Undoes back to (and through) the most recent checkpoint.
    pub fn undo_to_checkpoint(&mut self) {
        self.history.undo_to_checkpoint(&mut self.board);
    }

    /// Returns the cell touched by the most recent single-cell command.
    #[must_use]
    pub fn last_changed_cell(&self) -> Option<Position> {
        self.history.last_changed_cell()
    }

    /// Classifies the board's givens, running the solver at most once per
    /// change to the given set.
    ///
    /// On a unique solution the full grid is cached into the board, which
    /// is what [`GameSession::undo_to_solvable_state`] and the per-cell
    /// [`Cell::matches_solution`] checks consume.
    ///
    /// [`Cell::matches_solution`]: ninegrid_core::Cell::matches_solution
    pub fn solvability(&mut self) -> Solvability {
        if self.board.solvability().is_unknown() {
            match ninegrid_solver::classify(&self.board) {
                Solutions::None => self.board.record_no_solution(),
                Solutions::Unique(solution) => self.board.install_solution(&solution),
                Solutions::Multiple => self.board.record_multiple_solutions(),
            }
        }
        self.board.solvability()
    }

    /// Rewinds the history until no filled cell disagrees with the unique
    /// solution. Returns the number of undone commands.
    ///
    /// # Panics
    ///
    /// Panics when the board is not uniquely solvable; check
    /// [`GameSession::solvability`] first.
    pub fn undo_to_solvable_state(&mut self) -> usize {
        let _ = self.solvability();
        self.history.undo_to_solvable_state(&mut self.board)
    }
}

#[cfg(test)]
mod tests {
    use ninegrid_core::{Digit, DigitGrid, NoteSet};

    use super::*;

    const SOLVED: &str =
        "185362947793148526246795183564239871931874265827516394318427659672951438459683712";

    fn solved_grid() -> DigitGrid {
        SOLVED.parse().expect("valid solved grid")
    }

    fn puzzle_without(removed: &[Position]) -> Board {
        let mut givens = solved_grid();
        for &pos in removed {
            givens.set(pos, None);
        }
        Board::from_given_grid(&givens)
    }

    #[test]
    fn test_apply_rejects_given_cells() {
        let mut session = GameSession::new(puzzle_without(&[Position::new(0, 0)]));
        let given = Position::new(0, 1);
        let err = session
            .apply(Command::set_value(given, Some(Digit::D1)))
            .unwrap_err();
        assert_eq!(err, SessionError::CellNotEditable { pos: given });
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_apply_validates_after_execution() {
        let mut session = GameSession::new(Board::new());
        session
            .apply(Command::set_value(Position::new(0, 0), Some(Digit::D5)))
            .unwrap();
        session
            .apply(Command::set_value(Position::new(0, 5), Some(Digit::D5)))
            .unwrap();
        assert!(!session.board().cell(Position::new(0, 0)).is_valid());
    }

    #[test]
    fn test_solvability_is_cached() {
        let mut session = GameSession::new(puzzle_without(&[Position::new(4, 4)]));
        assert_eq!(session.solvability(), Solvability::Unique);
        // Second call answers from the cache.
        assert_eq!(session.board().solvability(), Solvability::Unique);
        assert_eq!(
            session.board().cell(Position::new(4, 4)).solution(),
            solved_grid().get(Position::new(4, 4)),
        );
    }

    #[test]
    fn test_solvability_classifications() {
        let mut unsolvable = GameSession::new(Board::deserialize(&format!(
            "55{}",
            "0".repeat(79)
        ))
        .unwrap());
        assert_eq!(unsolvable.solvability(), Solvability::NoSolution);

        let mut open = GameSession::new(Board::new());
        assert_eq!(open.solvability(), Solvability::Multiple);
    }

    #[test]
    fn test_mistake_rewind_scenario() {
        let (a, b, c) = (Position::new(0, 0), Position::new(4, 4), Position::new(8, 8));
        let mut session = GameSession::new(puzzle_without(&[a, b, c]));
        assert_eq!(session.solvability(), Solvability::Unique);

        let solution = solved_grid();
        let wrong = Digit::from_value(solution.get(a).unwrap().value() % 9 + 1);
        session.apply(Command::set_value(a, Some(wrong))).unwrap();
        session.apply(Command::set_value(b, solution.get(b))).unwrap();
        session.apply(Command::set_value(c, solution.get(c))).unwrap();

        let undone = session.undo_to_solvable_state();
        assert_eq!(undone, 3);
        assert!(session.board().cell(a).is_empty());
        assert!(session.board().cell(b).is_empty());
        assert!(session.board().cell(c).is_empty());
    }

    #[test]
    fn test_checkpoint_flow() {
        let mut session = GameSession::new(Board::new());
        session
            .apply(Command::set_value(Position::new(0, 0), Some(Digit::D5)))
            .unwrap();
        session.set_checkpoint();
        assert!(session.has_checkpoint());
        session
            .apply(Command::set_value(Position::new(0, 1), Some(Digit::D3)))
            .unwrap();
        session
            .apply(Command::set_value(Position::new(0, 2), Some(Digit::D7)))
            .unwrap();

        session.undo_to_checkpoint();
        assert_eq!(
            session.board().cell(Position::new(0, 0)).value(),
            Some(Digit::D5)
        );
        assert!(session.board().cell(Position::new(0, 1)).is_empty());
        assert!(session.board().cell(Position::new(0, 2)).is_empty());
    }

    #[test]
    fn test_reset_board_empties_history() {
        let mut session = GameSession::new(Board::new());
        session
            .apply(Command::set_value(Position::new(0, 0), Some(Digit::D5)))
            .unwrap();
        assert!(session.has_something_to_undo());

        session.reset_board(Board::new());
        assert!(!session.has_something_to_undo());
        assert!(session.board().is_empty());
    }

    #[test]
    fn test_history_survives_save_and_restore() {
        let mut session = GameSession::new(Board::new());
        session
            .apply(Command::edit_corner_note(
                Position::new(2, 2),
                NoteSet::EMPTY.with(Digit::D4),
            ))
            .unwrap();
        session
            .apply(Command::set_value(Position::new(2, 2), None))
            .unwrap();

        let board_text = session.board().to_string();
        let history_text = session.history().serialize();

        let mut restored = GameSession::new(Board::deserialize(&board_text).unwrap());
        restored.restore_history(CommandStack::deserialize(&history_text).unwrap());

        assert_eq!(restored.last_changed_cell(), Some(Position::new(2, 2)));
        assert!(restored.undo());
        assert!(restored.undo());
        assert!(restored
            .board()
            .cell(Position::new(2, 2))
            .corner_note()
            .is_empty());
    }
}
