//! Algorithm X search over the constraint matrix, with 0 / 1 / many
//! classification.

use log::debug;
use ninegrid_core::{Board, Digit, DigitGrid, Position};
use tinyvec::ArrayVec;

use crate::matrix::Matrix;

/// Classification of a board's solution space.
///
/// The search never enumerates: it stops as soon as a second full solution
/// is confirmed, so [`Solutions::Multiple`] means "two or more".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Solutions {
    /// The givens admit no solution.
    None,
    /// Exactly one solution exists.
    Unique(DigitGrid),
    /// Two or more solutions exist.
    Multiple,
}

impl Solutions {
    fn outcome_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Unique(_) => "unique",
            Self::Multiple => "multiple",
        }
    }
}

/// Counters describing one classification run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverStats {
    nodes_visited: usize,
    backtracks: usize,
}

impl SolverStats {
    /// Number of candidate rows tried during the search.
    #[must_use]
    pub const fn nodes_visited(&self) -> usize {
        self.nodes_visited
    }

    /// Number of dead ends the search backed out of.
    #[must_use]
    pub const fn backtracks(&self) -> usize {
        self.backtracks
    }
}

/// Classifies the solution space of `board`'s given cells.
///
/// Only non-editable cells holding a digit participate as givens; player
/// input is ignored. The computation is pure and holds no state after it
/// returns, so it may run on any thread.
#[must_use]
pub fn classify(board: &Board) -> Solutions {
    classify_with_stats(board).0
}

/// [`classify`] with search counters, for diagnostics.
#[must_use]
pub fn classify_with_stats(board: &Board) -> (Solutions, SolverStats) {
    let mut search = Search::new();
    let solutions = search.classify(board);
    debug!(
        "exact-cover classification: {} ({} nodes visited, {} backtracks)",
        solutions.outcome_name(),
        search.stats.nodes_visited,
        search.stats.backtracks,
    );
    (solutions, search.stats)
}

struct Search {
    matrix: Matrix,
    selected: ArrayVec<[usize; 81]>,
    first: DigitGrid,
    found: u8,
    stats: SolverStats,
}

impl Search {
    fn new() -> Self {
        Self {
            matrix: Matrix::new(),
            selected: ArrayVec::new(),
            first: DigitGrid::new(),
            found: 0,
            stats: SolverStats::default(),
        }
    }

    fn classify(&mut self, board: &Board) -> Solutions {
        if !self.load_givens(board) {
            return Solutions::None;
        }
        self.run();
        match self.found {
            0 => Solutions::None,
            1 => Solutions::Unique(self.first.clone()),
            _ => Solutions::Multiple,
        }
    }

    /// Permanently removes everything conflicting with the given clues.
    ///
    /// Returns `false` when two givens conflict directly; the board then
    /// has no solution and the search never starts.
    fn load_givens(&mut self, board: &Board) -> bool {
        for pos in Position::ALL {
            let cell = board.cell(pos);
            if cell.is_editable() {
                continue;
            }
            let Some(digit) = cell.value() else {
                continue;
            };
            let candidate = candidate_id(pos, digit);
            if !self.matrix.candidate_is_available(candidate) {
                return false;
            }
            self.matrix.select_candidate(candidate);
            self.selected.push(candidate);
        }
        true
    }

    /// The backtracking search. Keeps going after the first full solution
    /// until a second one is confirmed or the space is exhausted.
    fn run(&mut self) {
        let Some(column) = self.matrix.min_count_column() else {
            self.record_solution();
            return;
        };
        if self.matrix.count(column) == 0 {
            self.stats.backtracks += 1;
            return;
        }

        self.matrix.cover(column);
        let mut row = self.matrix.down(column);
        while row != column && self.found < 2 {
            self.stats.nodes_visited += 1;
            self.selected.push(self.matrix.candidate_of(row));
            let mut node = self.matrix.right(row);
            while node != row {
                let covered = self.matrix.column_of(node);
                self.matrix.cover(covered);
                node = self.matrix.right(node);
            }

            self.run();

            let mut node = self.matrix.left(row);
            while node != row {
                let covered = self.matrix.column_of(node);
                self.matrix.uncover(covered);
                node = self.matrix.left(node);
            }
            self.selected.pop();
            row = self.matrix.down(row);
        }
        self.matrix.uncover(column);
    }

    /// Called with the header ring empty: the selected candidates (givens
    /// included) cover all 81 cells.
    fn record_solution(&mut self) {
        if self.found == 0 {
            let mut grid = DigitGrid::new();
            for &candidate in &self.selected {
                let (pos, digit) = decode_candidate(candidate);
                grid.set(pos, Some(digit));
            }
            debug_assert!(grid.is_complete());
            self.first = grid;
        }
        self.found += 1;
    }
}

/// Maps a placement to its candidate row id.
fn candidate_id(pos: Position, digit: Digit) -> usize {
    pos.row() as usize * 81 + pos.col() as usize * 9 + (digit.value() as usize - 1)
}

/// Inverse of [`candidate_id`].
#[expect(clippy::cast_possible_truncation)]
fn decode_candidate(candidate: usize) -> (Position, Digit) {
    let row = candidate / 81;
    let col = (candidate / 9) % 9;
    let digit = candidate % 9 + 1;
    (
        Position::new(row as u8, col as u8),
        Digit::from_value(digit as u8),
    )
}
