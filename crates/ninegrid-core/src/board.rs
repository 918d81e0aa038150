//! The 9×9 board: cell arena, validation, notes, and the solution cache.

use std::fmt::{self, Debug};
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

use crate::{Cell, Digit, DigitGrid, House, NoteSet, Position};

/// The board's cached knowledge about its solution space.
///
/// The cache is derived from the *given* (non-editable) cells only, so any
/// change to which cells count as givens resets it to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Solvability {
    /// The solver has not run since the givens last changed.
    #[default]
    Unknown,
    /// The givens admit no solution.
    NoSolution,
    /// Exactly one solution exists; it is cached into every cell's
    /// `solution` field.
    Unique,
    /// Two or more solutions exist.
    Multiple,
}

impl Solvability {
    /// Returns `true` for the uncomputed state.
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }
}

/// A change listener registered on a board.
pub type ChangeListener = Box<dyn FnMut() + Send>;

/// Listener registry behind a single lock, so the host application may
/// register from a different thread than the one mutating the board.
#[derive(Default)]
struct Listeners {
    callbacks: Mutex<Vec<ChangeListener>>,
}

impl Listeners {
    fn fire(&self) {
        let mut callbacks = self
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for callback in callbacks.iter_mut() {
            callback();
        }
    }
}

impl Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("Listeners").field("len", &len).finish()
    }
}

/// A 9×9 Sudoku board.
///
/// The board owns its 81 [`Cell`]s in a flat arena indexed by [`Position`];
/// rows, columns, and boxes are the non-owning [`House`] views over that
/// arena. Every mutation fires the registered change listeners, except
/// inside a [`BatchGuard`] scope, which coalesces them into a single
/// notification.
///
/// # Examples
///
/// ```
/// use ninegrid_core::{Board, Digit, Position};
///
/// let mut board = Board::new();
/// board.set_value(Position::new(0, 0), Some(Digit::D5));
/// assert_eq!(board.cell(Position::new(0, 0)).value(), Some(Digit::D5));
/// assert!(board.validate());
/// ```
#[derive(Debug)]
pub struct Board {
    cells: [Cell; 81],
    solvability: Solvability,
    listeners: Listeners,
    batch_depth: u32,
    batch_dirty: bool,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            cells: [Cell::default(); 81],
            solvability: Solvability::Unknown,
            listeners: Listeners::default(),
            batch_depth: 0,
            batch_dirty: false,
        }
    }
}

/// Boards compare by cell contents; listeners are not part of the value.
impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}

impl Eq for Board {}

/// Cloning copies cells and the solution cache; the clone starts with an
/// empty listener registry.
impl Clone for Board {
    fn clone(&self) -> Self {
        Self {
            cells: self.cells,
            solvability: self.solvability,
            listeners: Listeners::default(),
            batch_depth: 0,
            batch_dirty: false,
        }
    }
}

impl Board {
    /// Creates an empty board: no values, no notes, every cell editable
    /// and valid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a board from a grid of given clues.
    ///
    /// Cells holding a digit become non-editable givens; the rest stay
    /// empty and editable.
    #[must_use]
    pub fn from_given_grid(givens: &DigitGrid) -> Self {
        let mut board = Self::new();
        for pos in Position::ALL {
            board.cells[pos.index()].value = givens.get(pos);
        }
        board.mark_given_cells_not_editable();
        board
    }

    /// Returns the cell at `pos`.
    #[must_use]
    pub const fn cell(&self, pos: Position) -> &Cell {
        &self.cells[pos.index()]
    }

    /// Returns the cell at (`row`, `col`).
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of range; an out-of-range index is a
    /// programming error, not recoverable input.
    #[must_use]
    pub const fn cell_at(&self, row: u8, col: u8) -> &Cell {
        self.cell(Position::new(row, col))
    }

    // -- mutation -----------------------------------------------------------

    /// Sets the value at `pos` (`None` clears the cell).
    ///
    /// Editability is a session-level policy and is not enforced here, but
    /// writing to a non-editable cell changes the given clues and so
    /// invalidates the solution cache.
    pub fn set_value(&mut self, pos: Position, value: Option<Digit>) {
        let was_given = !self.cells[pos.index()].editable;
        self.cells[pos.index()].value = value;
        if was_given {
            self.invalidate_solvability();
        }
        self.notify();
    }

    /// Replaces the corner note at `pos`.
    pub fn set_corner_note(&mut self, pos: Position, note: NoteSet) {
        self.cells[pos.index()].corner_note = note;
        self.notify();
    }

    /// Replaces the center note at `pos`.
    pub fn set_center_note(&mut self, pos: Position, note: NoteSet) {
        self.cells[pos.index()].center_note = note;
        self.notify();
    }

    /// Sets the editable flag at `pos`.
    ///
    /// Changing editability changes which cells count as givens, so the
    /// solution cache is invalidated.
    pub fn set_editable(&mut self, pos: Position, editable: bool) {
        self.cells[pos.index()].editable = editable;
        self.invalidate_solvability();
        self.notify();
    }

    /// Marks every cell editable and invalidates the solution cache.
    pub fn mark_all_editable(&mut self) {
        self.batched(|board| {
            for cell in &mut board.cells {
                cell.editable = true;
            }
            board.notify();
        });
        self.invalidate_solvability();
    }

    /// Marks every cell currently holding a value as a non-editable given
    /// and invalidates the solution cache.
    ///
    /// Empty cells stay editable, so a board can never natively hold a
    /// non-editable empty cell (that state only arrives via legacy import).
    pub fn mark_given_cells_not_editable(&mut self) {
        self.batched(|board| {
            for cell in &mut board.cells {
                if cell.value.is_some() {
                    cell.editable = false;
                }
            }
            board.notify();
        });
        self.invalidate_solvability();
    }

    // -- validation ---------------------------------------------------------

    /// Validates the whole board, marking conflicting cells invalid.
    ///
    /// Every cell's `valid` flag is first reset to `true`, then each of the
    /// 27 houses marks all cells sharing a nonzero value with another cell
    /// of the house as invalid. Listeners observe a single notification for
    /// the whole pass, never an intermediate state.
    ///
    /// Returns `true` iff no house reported a conflict.
    pub fn validate(&mut self) -> bool {
        self.batched(|board| {
            for cell in &mut board.cells {
                cell.valid = true;
            }
            let mut all_valid = true;
            for house in House::ALL {
                all_valid &= board.validate_house(house);
            }
            board.notify();
            all_valid
        })
    }

    /// Marks duplicate-valued cells of one house invalid. Never resets
    /// cells to valid.
    fn validate_house(&mut self, house: House) -> bool {
        let positions = house.positions();
        let mut counts = [0u8; 9];
        for pos in positions {
            if let Some(digit) = self.cells[pos.index()].value {
                counts[digit.value() as usize - 1] += 1;
            }
        }
        let mut valid = true;
        for pos in positions {
            let cell = &mut self.cells[pos.index()];
            if let Some(digit) = cell.value
                && counts[digit.value() as usize - 1] > 1
            {
                cell.valid = false;
                valid = false;
            }
        }
        valid
    }

    /// Returns `true` if no cell holds a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }

    /// Returns `true` if every cell holds a value and passed the last
    /// validation.
    ///
    /// Completion is defined against the Sudoku rules, not the cached
    /// solution: any conflict-free filling completes the board.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.cells
            .iter()
            .all(|cell| cell.value.is_some() && cell.valid)
    }

    // -- notes --------------------------------------------------------------

    /// Overwrites the center note of every editable empty cell with the
    /// digits not excluded by its row, column, and box.
    pub fn fill_notes(&mut self) {
        self.batched(|board| {
            for pos in Position::ALL {
                if board.cells[pos.index()].editable && board.cells[pos.index()].value.is_none() {
                    let note = board.candidates_at(pos);
                    board.cells[pos.index()].center_note = note;
                }
            }
            board.notify();
        });
    }

    /// Overwrites the center note of every editable empty cell with all
    /// nine digits.
    pub fn fill_notes_all_values(&mut self) {
        self.batched(|board| {
            for cell in &mut board.cells {
                if cell.editable && cell.value.is_none() {
                    cell.center_note = NoteSet::FULL;
                }
            }
            board.notify();
        });
    }

    /// Returns the digits not present in any peer of `pos`.
    #[must_use]
    pub fn candidates_at(&self, pos: Position) -> NoteSet {
        let mut note = NoteSet::FULL;
        for peer in pos.peers() {
            if let Some(digit) = self.cells[peer.index()].value {
                note = note.without(digit);
            }
        }
        note
    }

    /// Strips `digit` from the corner and center notes of every peer of
    /// `pos`, so stale notes don't linger after a placement.
    pub fn remove_notes_for_placed_digit(&mut self, pos: Position, digit: Digit) {
        self.batched(|board| {
            for peer in pos.peers() {
                let cell = &mut board.cells[peer.index()];
                cell.corner_note = cell.corner_note.without(digit);
                cell.center_note = cell.center_note.without(digit);
            }
            board.notify();
        });
    }

    // -- queries ------------------------------------------------------------

    /// Counts placed occurrences of each digit; index 0 holds the count
    /// for digit 1.
    ///
    /// The UI uses this to grey out digits already placed nine times.
    #[must_use]
    pub fn value_use_counts(&self) -> [usize; 9] {
        let mut counts = [0; 9];
        for cell in &self.cells {
            if let Some(digit) = cell.value {
                counts[digit.value() as usize - 1] += 1;
            }
        }
        counts
    }

    /// Returns the current values of all cells.
    #[must_use]
    pub fn value_grid(&self) -> DigitGrid {
        let mut grid = DigitGrid::new();
        for pos in Position::ALL {
            grid.set(pos, self.cells[pos.index()].value);
        }
        grid
    }

    /// Returns the given (non-editable) cells' values.
    #[must_use]
    pub fn given_grid(&self) -> DigitGrid {
        let mut grid = DigitGrid::new();
        for pos in Position::ALL {
            let cell = &self.cells[pos.index()];
            if !cell.editable {
                grid.set(pos, cell.value);
            }
        }
        grid
    }

    // -- solution cache -----------------------------------------------------

    /// Returns the cached solvability classification.
    #[must_use]
    pub const fn solvability(&self) -> Solvability {
        self.solvability
    }

    /// Caches a unique solution: stores each cell's solution digit and sets
    /// the classification to [`Solvability::Unique`].
    ///
    /// # Panics
    ///
    /// Panics if `solution` is not a complete grid.
    pub fn install_solution(&mut self, solution: &DigitGrid) {
        assert!(
            solution.is_complete(),
            "a unique solution must fill every cell"
        );
        for pos in Position::ALL {
            self.cells[pos.index()].solution = solution.get(pos);
        }
        self.solvability = Solvability::Unique;
    }

    /// Records that the givens admit no solution.
    pub const fn record_no_solution(&mut self) {
        self.solvability = Solvability::NoSolution;
    }

    /// Records that the givens admit two or more solutions.
    pub const fn record_multiple_solutions(&mut self) {
        self.solvability = Solvability::Multiple;
    }

    /// Forgets the cached classification and per-cell solution digits.
    pub fn invalidate_solvability(&mut self) {
        self.solvability = Solvability::Unknown;
        for cell in &mut self.cells {
            cell.solution = None;
        }
    }

    // -- change notification ------------------------------------------------

    /// Registers a listener invoked after every board change (or once per
    /// batched scope).
    ///
    /// The registry sits behind a single lock, so registration is safe from
    /// a thread other than the mutating one. Listeners run on the mutating
    /// thread.
    pub fn add_change_listener(&mut self, listener: impl FnMut() + Send + 'static) {
        self.listeners
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(listener));
    }

    /// Opens a batching scope: mutations made through the guard fire a
    /// single notification when the guard drops, and none before.
    pub fn batch(&mut self) -> BatchGuard<'_> {
        self.begin_batch();
        BatchGuard { board: self }
    }

    fn batched<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_batch();
        let result = f(self);
        self.end_batch();
        result
    }

    fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    fn end_batch(&mut self) {
        self.batch_depth -= 1;
        if self.batch_depth == 0 && self.batch_dirty {
            self.batch_dirty = false;
            self.listeners.fire();
        }
    }

    fn notify(&mut self) {
        if self.batch_depth > 0 {
            self.batch_dirty = true;
        } else {
            self.listeners.fire();
        }
    }
}

/// RAII scope that buffers change notifications and flushes exactly one on
/// drop.
///
/// Obtained from [`Board::batch`]; dereferences to the board so mutations
/// read naturally:
///
/// ```
/// use ninegrid_core::{Board, Digit, Position};
///
/// let mut board = Board::new();
/// let mut batch = board.batch();
/// batch.set_value(Position::new(0, 0), Some(Digit::D1));
/// batch.set_value(Position::new(0, 1), Some(Digit::D2));
/// drop(batch); // listeners observe one notification
/// ```
pub struct BatchGuard<'a> {
    board: &'a mut Board,
}

impl Deref for BatchGuard<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for BatchGuard<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.board.end_batch();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counted_listener(board: &mut Board) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&count);
        board.add_change_listener(move || {
            handle.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn test_new_board_is_empty_and_valid() {
        let mut board = Board::new();
        assert!(board.is_empty());
        assert!(!board.is_completed());
        assert!(board.validate());
        assert_eq!(board.solvability(), Solvability::Unknown);
    }

    #[test]
    fn test_validate_marks_exactly_the_duplicates() {
        let mut board = Board::new();
        board.set_value(Position::new(0, 0), Some(Digit::D5));
        board.set_value(Position::new(0, 7), Some(Digit::D5));
        board.set_value(Position::new(4, 4), Some(Digit::D5));

        assert!(!board.validate());
        assert!(!board.cell(Position::new(0, 0)).is_valid());
        assert!(!board.cell(Position::new(0, 7)).is_valid());
        // Same digit in an unrelated house stays valid.
        assert!(board.cell(Position::new(4, 4)).is_valid());

        // Clearing one duplicate clears the marks on the next pass.
        board.set_value(Position::new(0, 7), None);
        assert!(board.validate());
        assert!(board.cell(Position::new(0, 0)).is_valid());
    }

    #[test]
    fn test_validate_detects_box_conflicts() {
        let mut board = Board::new();
        board.set_value(Position::new(0, 0), Some(Digit::D3));
        board.set_value(Position::new(1, 1), Some(Digit::D3));
        assert!(!board.validate());
        assert!(!board.cell(Position::new(0, 0)).is_valid());
        assert!(!board.cell(Position::new(1, 1)).is_valid());
    }

    #[test]
    fn test_validate_fires_single_notification() {
        let mut board = Board::new();
        board.set_value(Position::new(0, 0), Some(Digit::D1));
        let count = counted_listener(&mut board);
        board.validate();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_batch_guard_coalesces_notifications() {
        let mut board = Board::new();
        let count = counted_listener(&mut board);

        let mut batch = board.batch();
        batch.set_value(Position::new(0, 0), Some(Digit::D1));
        batch.set_value(Position::new(0, 1), Some(Digit::D2));
        batch.set_value(Position::new(0, 2), Some(Digit::D3));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        drop(batch);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        board.set_value(Position::new(0, 3), Some(Digit::D4));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_empty_batch_fires_nothing() {
        let mut board = Board::new();
        let count = counted_listener(&mut board);
        drop(board.batch());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_fill_notes_sets_complement_of_peers() {
        let mut board = Board::new();
        board.set_value(Position::new(0, 1), Some(Digit::D1));
        board.set_value(Position::new(0, 2), Some(Digit::D2));
        board.set_value(Position::new(1, 0), Some(Digit::D3));
        board.set_value(Position::new(8, 0), Some(Digit::D4));
        board.fill_notes();

        let expected: NoteSet = [Digit::D5, Digit::D6, Digit::D7, Digit::D8, Digit::D9]
            .into_iter()
            .collect();
        assert_eq!(board.cell(Position::new(0, 0)).center_note(), expected);
        // Cells holding values are left alone.
        assert!(board.cell(Position::new(0, 1)).center_note().is_empty());
    }

    #[test]
    fn test_fill_notes_all_values() {
        let mut board = Board::new();
        board.set_value(Position::new(0, 0), Some(Digit::D1));
        board.fill_notes_all_values();
        assert!(board.cell(Position::new(0, 0)).center_note().is_empty());
        assert_eq!(board.cell(Position::new(5, 5)).center_note(), NoteSet::FULL);
    }

    #[test]
    fn test_fill_notes_skips_given_cells() {
        let mut board = Board::new();
        board.set_value(Position::new(0, 0), Some(Digit::D1));
        board.mark_given_cells_not_editable();
        board.set_value(Position::new(0, 0), None);
        // The given cell is still non-editable even though it is now empty.
        board.fill_notes_all_values();
        assert!(board.cell(Position::new(0, 0)).center_note().is_empty());
    }

    #[test]
    fn test_remove_notes_for_placed_digit() {
        let mut board = Board::new();
        let note = NoteSet::EMPTY.with(Digit::D5).with(Digit::D6);
        board.set_corner_note(Position::new(0, 8), note);
        board.set_center_note(Position::new(8, 0), note);
        board.set_center_note(Position::new(4, 4), note);

        board.set_value(Position::new(0, 0), Some(Digit::D5));
        board.remove_notes_for_placed_digit(Position::new(0, 0), Digit::D5);

        let only_six = NoteSet::EMPTY.with(Digit::D6);
        assert_eq!(board.cell(Position::new(0, 8)).corner_note(), only_six);
        assert_eq!(board.cell(Position::new(8, 0)).center_note(), only_six);
        // Not a peer: untouched.
        assert_eq!(board.cell(Position::new(4, 4)).center_note(), note);
    }

    #[test]
    fn test_value_use_counts() {
        let mut board = Board::new();
        board.set_value(Position::new(0, 0), Some(Digit::D5));
        board.set_value(Position::new(1, 3), Some(Digit::D5));
        board.set_value(Position::new(2, 6), Some(Digit::D9));
        let counts = board.value_use_counts();
        assert_eq!(counts[4], 2);
        assert_eq!(counts[8], 1);
        assert_eq!(counts[0], 0);
    }

    #[test]
    fn test_editable_changes_invalidate_solution_cache() {
        let solved: DigitGrid =
            "185362947793148526246795183564239871931874265827516394318427659672951438459683712"
                .parse()
                .unwrap();
        let mut board = Board::new();
        board.install_solution(&solved);
        assert_eq!(board.solvability(), Solvability::Unique);
        assert!(board.cell(Position::new(0, 0)).solution().is_some());

        board.mark_all_editable();
        assert_eq!(board.solvability(), Solvability::Unknown);
        assert_eq!(board.cell(Position::new(0, 0)).solution(), None);

        board.install_solution(&solved);
        board.set_editable(Position::new(0, 0), false);
        assert_eq!(board.solvability(), Solvability::Unknown);
    }

    #[test]
    fn test_from_given_grid() {
        let givens: DigitGrid = format!("17{}", ".".repeat(79)).parse().unwrap();
        let board = Board::from_given_grid(&givens);
        assert_eq!(board.cell(Position::new(0, 0)).value(), Some(Digit::D1));
        assert!(!board.cell(Position::new(0, 0)).is_editable());
        assert!(board.cell(Position::new(0, 2)).is_editable());
        assert_eq!(board.given_grid(), givens);
    }

    #[test]
    fn test_is_completed_requires_validity() {
        let solved: DigitGrid =
            "185362947793148526246795183564239871931874265827516394318427659672951438459683712"
                .parse()
                .unwrap();
        let mut board = Board::new();
        for pos in Position::ALL {
            board.set_value(pos, solved.get(pos));
        }
        board.validate();
        assert!(board.is_completed());

        // Introduce a conflict: complete but not completed.
        board.set_value(Position::new(0, 0), board.cell(Position::new(0, 1)).value());
        board.validate();
        assert!(!board.is_completed());
    }

    #[test]
    fn test_clone_drops_listeners_but_keeps_cells() {
        let mut board = Board::new();
        let count = counted_listener(&mut board);
        board.set_value(Position::new(3, 3), Some(Digit::D8));

        let mut copy = board.clone();
        assert_eq!(copy, board);
        copy.set_value(Position::new(3, 4), Some(Digit::D9));
        // Only the original's listener ever fired.
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
