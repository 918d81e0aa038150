//! The toroidal constraint matrix for 9×9 Sudoku as an exact-cover
//! problem.
//!
//! The matrix has 324 constraint columns and 729 candidate rows. Columns,
//! in order: "cell (r, c) holds exactly one digit" (81), "row r contains
//! digit d exactly once" (81), "column c contains digit d exactly once"
//! (81), "box b contains digit d exactly once" (81). Every candidate row
//! `(r, c, d)` carries exactly one node in each of its four columns.
//!
//! Nodes live in a flat arena indexed by `usize`: index 0 is the head of
//! the column-header ring, 1-324 are the column headers, and the remaining
//! 2916 are candidate nodes. Links are arena indices, so the whole
//! structure is `Clone` + `PartialEq`, which the cover/uncover tests rely
//! on.

/// Number of constraint columns.
pub(crate) const COLUMN_COUNT: usize = 324;

/// Number of candidate rows (9 rows × 9 columns × 9 digits).
pub(crate) const CANDIDATE_COUNT: usize = 729;

/// Head of the column-header ring.
pub(crate) const HEAD: usize = 0;

/// One node of the toroidal structure.
///
/// `column` is the arena index of the node's column header (headers point
/// at themselves); `candidate` is the candidate row id, unused for the
/// head and the headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Node {
    left: usize,
    right: usize,
    up: usize,
    down: usize,
    column: usize,
    candidate: usize,
}

/// The dancing-links arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Matrix {
    nodes: Vec<Node>,
    /// Live candidate-node count per column header (min-remaining-values
    /// heuristic); index 0 is unused.
    counts: Vec<usize>,
    /// Covered flag per column header; used to detect conflicting givens
    /// before search begins.
    covered: Vec<bool>,
    /// First arena node (the cell-constraint node) of each candidate row.
    row_start: Vec<usize>,
}

/// Returns the four column header indices of candidate `(r, c, d)`,
/// with `d` being `digit - 1`.
fn candidate_columns(candidate: usize) -> [usize; 4] {
    let (r, c, d) = (candidate / 81, (candidate / 9) % 9, candidate % 9);
    let b = (r / 3) * 3 + c / 3;
    [
        1 + r * 9 + c,
        1 + 81 + r * 9 + d,
        1 + 162 + c * 9 + d,
        1 + 243 + b * 9 + d,
    ]
}

impl Matrix {
    /// Builds the full 324-column, 729-row matrix with no givens applied.
    pub(crate) fn new() -> Self {
        let mut nodes = Vec::with_capacity(1 + COLUMN_COUNT + CANDIDATE_COUNT * 4);
        nodes.push(Node {
            left: COLUMN_COUNT,
            right: 1,
            up: HEAD,
            down: HEAD,
            column: HEAD,
            candidate: usize::MAX,
        });
        for column in 1..=COLUMN_COUNT {
            nodes.push(Node {
                left: column - 1,
                right: if column == COLUMN_COUNT { HEAD } else { column + 1 },
                up: column,
                down: column,
                column,
                candidate: usize::MAX,
            });
        }
        let mut matrix = Self {
            nodes,
            counts: vec![0; COLUMN_COUNT + 1],
            covered: vec![false; COLUMN_COUNT + 1],
            row_start: vec![0; CANDIDATE_COUNT],
        };
        for candidate in 0..CANDIDATE_COUNT {
            matrix.add_candidate(candidate);
        }
        matrix
    }

    /// Appends the four nodes of one candidate row, linking each to the
    /// bottom of its column.
    fn add_candidate(&mut self, candidate: usize) {
        let columns = candidate_columns(candidate);
        let first = self.nodes.len();
        self.row_start[candidate] = first;
        for (i, &column) in columns.iter().enumerate() {
            let node = first + i;
            let up = self.nodes[column].up;
            self.nodes.push(Node {
                left: if i == 0 { first + 3 } else { node - 1 },
                right: if i == 3 { first } else { node + 1 },
                up,
                down: column,
                column,
                candidate,
            });
            self.nodes[up].down = node;
            self.nodes[column].up = node;
            self.counts[column] += 1;
        }
    }

    pub(crate) fn right(&self, node: usize) -> usize {
        self.nodes[node].right
    }

    pub(crate) fn left(&self, node: usize) -> usize {
        self.nodes[node].left
    }

    pub(crate) fn down(&self, node: usize) -> usize {
        self.nodes[node].down
    }

    pub(crate) fn column_of(&self, node: usize) -> usize {
        self.nodes[node].column
    }

    pub(crate) fn candidate_of(&self, node: usize) -> usize {
        self.nodes[node].candidate
    }

    pub(crate) fn count(&self, column: usize) -> usize {
        self.counts[column]
    }

    /// Returns the live column with the fewest remaining candidates, or
    /// `None` when the header ring is empty (all constraints satisfied).
    ///
    /// Ties break to the first column found.
    pub(crate) fn min_count_column(&self) -> Option<usize> {
        let mut column = self.right(HEAD);
        if column == HEAD {
            return None;
        }
        let mut best = column;
        while column != HEAD {
            if self.counts[column] < self.counts[best] {
                best = column;
            }
            column = self.right(column);
        }
        Some(best)
    }

    /// Covers a constraint column: unsplices its header from the header
    /// ring, then unsplices every other candidate row touching the column
    /// from all its remaining columns.
    ///
    /// Rows are processed top-to-bottom and, within a row, left-to-right
    /// from the triggering node, so [`Matrix::uncover`] can walk the exact
    /// mirror.
    pub(crate) fn cover(&mut self, column: usize) {
        let (left, right) = (self.nodes[column].left, self.nodes[column].right);
        self.nodes[left].right = right;
        self.nodes[right].left = left;
        self.covered[column] = true;

        let mut row = self.nodes[column].down;
        while row != column {
            let mut node = self.nodes[row].right;
            while node != row {
                let (up, down) = (self.nodes[node].up, self.nodes[node].down);
                self.nodes[up].down = down;
                self.nodes[down].up = up;
                self.counts[self.nodes[node].column] -= 1;
                node = self.nodes[node].right;
            }
            row = self.nodes[row].down;
        }
    }

    /// Exact mirror of [`Matrix::cover`], applied in reverse order
    /// (bottom-to-top, right-to-left). Cover/uncover pairs must nest
    /// perfectly to preserve pointer integrity.
    pub(crate) fn uncover(&mut self, column: usize) {
        let mut row = self.nodes[column].up;
        while row != column {
            let mut node = self.nodes[row].left;
            while node != row {
                self.counts[self.nodes[node].column] += 1;
                let (up, down) = (self.nodes[node].up, self.nodes[node].down);
                self.nodes[up].down = node;
                self.nodes[down].up = node;
                node = self.nodes[node].left;
            }
            row = self.nodes[row].up;
        }

        self.covered[column] = false;
        let (left, right) = (self.nodes[column].left, self.nodes[column].right);
        self.nodes[left].right = column;
        self.nodes[right].left = column;
    }

    /// Returns `true` while none of the candidate row's four columns has
    /// been covered.
    ///
    /// A given whose candidate row is unavailable conflicts with an
    /// earlier given.
    pub(crate) fn candidate_is_available(&self, candidate: usize) -> bool {
        let first = self.row_start[candidate];
        (0..4).all(|i| !self.covered[self.nodes[first + i].column])
    }

    /// Permanently selects a candidate row before search begins, covering
    /// each of its columns left-to-right starting from the cell column.
    pub(crate) fn select_candidate(&mut self, candidate: usize) {
        let first = self.row_start[candidate];
        for i in 0..4 {
            let column = self.nodes[first + i].column;
            self.cover(column);
        }
    }
}
