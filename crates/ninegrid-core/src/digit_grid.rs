//! A plain 9×9 grid of optional digits.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::{Digit, Position};

/// An 81-cell grid of optional digits in row-major order.
///
/// This is the value-only view of a board: no notes, no editability. It is
/// the currency between the board and the solver (solver output is a
/// complete `DigitGrid`) and the backing of the plain text formats.
///
/// # Examples
///
/// ```
/// use ninegrid_core::{Digit, DigitGrid, Position};
///
/// let mut grid = DigitGrid::new();
/// grid.set(Position::new(0, 0), Some(Digit::D5));
/// assert_eq!(grid.get(Position::new(0, 0)), Some(Digit::D5));
/// assert!(!grid.is_complete());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitGrid {
    cells: [Option<Digit>; 81],
}

impl Default for DigitGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl DigitGrid {
    /// Creates an empty grid.
    #[must_use]
    pub const fn new() -> Self {
        Self { cells: [None; 81] }
    }

    /// Returns the digit at `pos`, `None` when empty.
    #[must_use]
    pub const fn get(&self, pos: Position) -> Option<Digit> {
        self.cells[pos.index()]
    }

    /// Sets the digit at `pos`.
    pub const fn set(&mut self, pos: Position, digit: Option<Digit>) {
        self.cells[pos.index()] = digit;
    }

    /// Returns `true` if every cell holds a digit.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Returns `true` if no cell holds a digit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

/// Prints 81 characters in row-major order, `.` for empty cells.
impl Display for DigitGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in &self.cells {
            match cell {
                Some(digit) => write!(f, "{digit}")?,
                None => write!(f, ".")?,
            }
        }
        Ok(())
    }
}

/// Errors raised when parsing a digit-grid string.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseDigitGridError {
    /// The input contained a character that is neither a digit, an empty
    /// marker (`.`, `0`, `_`), nor whitespace.
    #[display("invalid grid character {ch:?}")]
    InvalidChar {
        /// The offending character.
        ch: char,
    },
    /// The input did not contain exactly 81 cells.
    #[display("expected 81 cells, found {found}")]
    WrongLength {
        /// The number of cells found.
        found: usize,
    },
}

/// Parses 81 cells in row-major order.
///
/// `1`-`9` are digits; `.`, `0`, and `_` mark empty cells; whitespace is
/// ignored so grids may be written over multiple lines.
impl FromStr for DigitGrid {
    type Err = ParseDigitGridError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut grid = Self::new();
        let mut count = 0;
        for ch in text.chars() {
            let digit = match ch {
                '1'..='9' => Digit::from_char(ch),
                '.' | '0' | '_' => None,
                ch if ch.is_whitespace() => continue,
                ch => return Err(ParseDigitGridError::InvalidChar { ch }),
            };
            if count < 81 {
                grid.cells[count] = digit;
            }
            count += 1;
        }
        if count != 81 {
            return Err(ParseDigitGridError::WrongLength { found: count });
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLVED: &str =
        "185362947793148526246795183564239871931874265827516394318427659672951438459683712";

    #[test]
    fn test_parse_and_display_round_trip() {
        let grid: DigitGrid = SOLVED.parse().unwrap();
        assert!(grid.is_complete());
        assert_eq!(grid.to_string(), SOLVED);
    }

    #[test]
    fn test_parse_multi_line() {
        let grid: DigitGrid = "
            5__ ___ ___
            ___ ___ ___
            ___ ___ ___
            ___ ___ ___
            ___ ___ ___
            ___ ___ ___
            ___ ___ ___
            ___ ___ ___
            ___ ___ __1
        "
        .parse()
        .unwrap();
        assert_eq!(grid.get(Position::new(0, 0)), Some(Digit::D5));
        assert_eq!(grid.get(Position::new(8, 8)), Some(Digit::D1));
        assert_eq!(grid.get(Position::new(4, 4)), None);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            "x".repeat(81).parse::<DigitGrid>(),
            Err(ParseDigitGridError::InvalidChar { ch: 'x' })
        ));
        assert!(matches!(
            ".".repeat(80).parse::<DigitGrid>(),
            Err(ParseDigitGridError::WrongLength { found: 80 })
        ));
        assert!(matches!(
            ".".repeat(82).parse::<DigitGrid>(),
            Err(ParseDigitGridError::WrongLength { found: 82 })
        ));
    }

    #[test]
    fn test_empty_and_complete() {
        let empty = DigitGrid::new();
        assert!(empty.is_empty());
        assert!(!empty.is_complete());

        let solved: DigitGrid = SOLVED.parse().unwrap();
        assert!(!solved.is_empty());
        assert!(solved.is_complete());
    }
}
