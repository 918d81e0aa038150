//! Candidate-digit notes attached to a cell.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::Digit;

/// An immutable set of candidate digits (1-9) annotating a cell.
///
/// A cell carries two of these: a corner note and a center note. The set is
/// a value type backed by a 9-bit mask; every mutation produces a new set,
/// leaving the original untouched.
///
/// Digit range checking happens at the [`Digit`] boundary, so a `NoteSet`
/// can never contain an out-of-range digit.
///
/// # Examples
///
/// ```
/// use ninegrid_core::{Digit, NoteSet};
///
/// let note = NoteSet::EMPTY.with(Digit::D3).with(Digit::D7);
/// assert!(note.contains(Digit::D3));
/// assert_eq!(note.len(), 2);
///
/// // Mutations return new values
/// let toggled = note.toggled(Digit::D3);
/// assert!(!toggled.contains(Digit::D3));
/// assert!(note.contains(Digit::D3));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NoteSet {
    bits: u16,
}

impl NoteSet {
    /// The set containing no digits.
    pub const EMPTY: Self = Self { bits: 0 };

    /// The set containing all nine digits.
    pub const FULL: Self = Self { bits: 0x1ff };

    /// Creates an empty note set.
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    const fn bit(digit: Digit) -> u16 {
        1 << (digit.value() - 1)
    }

    /// Returns a copy of this set with `digit` added.
    #[must_use]
    pub const fn with(self, digit: Digit) -> Self {
        Self {
            bits: self.bits | Self::bit(digit),
        }
    }

    /// Returns a copy of this set with `digit` removed.
    #[must_use]
    pub const fn without(self, digit: Digit) -> Self {
        Self {
            bits: self.bits & !Self::bit(digit),
        }
    }

    /// Returns a copy of this set with `digit`'s membership flipped.
    #[must_use]
    pub const fn toggled(self, digit: Digit) -> Self {
        Self {
            bits: self.bits ^ Self::bit(digit),
        }
    }

    /// Returns `true` if `digit` is a member of this set.
    #[must_use]
    pub const fn contains(self, digit: Digit) -> bool {
        self.bits & Self::bit(digit) != 0
    }

    /// Returns the number of digits in this set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Returns `true` if this set contains no digits.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Returns the members of this set in ascending order.
    pub fn iter(self) -> impl Iterator<Item = Digit> {
        Digit::ALL.into_iter().filter(move |d| self.contains(*d))
    }

    /// Returns the underlying 9-bit mask.
    ///
    /// Bit 0 represents digit 1, bit 8 digit 9. This is the value written
    /// by the serialized form.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.bits
    }

    /// Reconstructs a note set from a raw bitmask, rejecting masks with
    /// bits outside the low nine.
    #[must_use]
    pub const fn try_from_bits(bits: u16) -> Option<Self> {
        if bits <= 0x1ff {
            Some(Self { bits })
        } else {
            None
        }
    }
}

impl FromIterator<Digit> for NoteSet {
    fn from_iter<I: IntoIterator<Item = Digit>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

/// Notes serialize as the decimal value of the underlying bitmask.
impl Display for NoteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.bits, f)
    }
}

/// Errors raised when parsing serialized note text.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseNoteError {
    /// A comma-separated entry was not a digit in 1-9.
    #[display("note digit out of range: {text:?}")]
    InvalidDigit {
        /// The offending entry.
        text: String,
    },
    /// A decimal bitmask had bits outside the low nine.
    #[display("note bitmask out of range: {bits}")]
    InvalidBits {
        /// The offending mask value.
        bits: u16,
    },
    /// The text matched no recognized note encoding.
    #[display("unrecognized note text: {text:?}")]
    Unrecognized {
        /// The offending text.
        text: String,
    },
}

/// Parses any historically produced note encoding.
///
/// Accepted inputs are the decimal bitmask (current format), a legacy
/// comma-separated digit list such as `1,4,9`, and `-` or the empty string
/// for "no notes".
impl FromStr for NoteSet {
    type Err = ParseNoteError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if text.is_empty() || text == "-" {
            return Ok(Self::EMPTY);
        }
        if text.contains(',') {
            let mut note = Self::EMPTY;
            for entry in text.split(',').filter(|entry| !entry.is_empty()) {
                let digit = entry
                    .parse::<u8>()
                    .ok()
                    .and_then(Digit::try_from_value)
                    .ok_or_else(|| ParseNoteError::InvalidDigit {
                        text: entry.to_owned(),
                    })?;
                note = note.with(digit);
            }
            return Ok(note);
        }
        let bits = text
            .parse::<u16>()
            .map_err(|_| ParseNoteError::Unrecognized {
                text: text.to_owned(),
            })?;
        Self::try_from_bits(bits).ok_or(ParseNoteError::InvalidBits { bits })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::Digit::*;

    #[test]
    fn test_membership() {
        let note = NoteSet::EMPTY.with(D1).with(D5).with(D9);
        assert_eq!(note.len(), 3);
        assert!(note.contains(D1));
        assert!(note.contains(D5));
        assert!(!note.contains(D2));
        assert!(!note.is_empty());
        assert!(NoteSet::EMPTY.is_empty());
    }

    #[test]
    fn test_iteration_is_ascending() {
        let note: NoteSet = [D9, D1, D5, D3].into_iter().collect();
        let collected: Vec<_> = note.iter().collect();
        assert_eq!(collected, vec![D1, D3, D5, D9]);
    }

    #[test]
    fn test_constants() {
        assert_eq!(NoteSet::EMPTY.len(), 0);
        assert_eq!(NoteSet::FULL.len(), 9);
        for digit in Digit::ALL {
            assert!(NoteSet::FULL.contains(digit));
        }
    }

    #[test]
    fn test_bits_round_trip() {
        let note = NoteSet::EMPTY.with(D2).with(D8);
        assert_eq!(NoteSet::try_from_bits(note.bits()), Some(note));
        assert_eq!(NoteSet::try_from_bits(0x200), None);
    }

    #[test]
    fn test_parse_decimal_bitmask() {
        let note = NoteSet::EMPTY.with(D1).with(D4).with(D9);
        assert_eq!(note.to_string().parse::<NoteSet>().unwrap(), note);
        assert_eq!("0".parse::<NoteSet>().unwrap(), NoteSet::EMPTY);
    }

    #[test]
    fn test_parse_legacy_formats() {
        let note = NoteSet::EMPTY.with(D1).with(D4).with(D9);
        assert_eq!("1,4,9".parse::<NoteSet>().unwrap(), note);
        // Trailing separators appear in old data
        assert_eq!("1,4,9,".parse::<NoteSet>().unwrap(), note);
        assert_eq!("-".parse::<NoteSet>().unwrap(), NoteSet::EMPTY);
        assert_eq!("".parse::<NoteSet>().unwrap(), NoteSet::EMPTY);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            "10,2".parse::<NoteSet>(),
            Err(ParseNoteError::InvalidDigit { .. })
        ));
        assert!(matches!(
            "512".parse::<NoteSet>(),
            Err(ParseNoteError::InvalidBits { bits: 512 })
        ));
        assert!(matches!(
            "abc".parse::<NoteSet>(),
            Err(ParseNoteError::Unrecognized { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_add_is_idempotent(bits in 0u16..512, value in 1u8..=9) {
            let note = NoteSet::try_from_bits(bits).unwrap();
            let digit = Digit::from_value(value);
            prop_assert_eq!(note.with(digit).with(digit), note.with(digit));
        }

        #[test]
        fn prop_toggle_is_involution(bits in 0u16..512, value in 1u8..=9) {
            let note = NoteSet::try_from_bits(bits).unwrap();
            let digit = Digit::from_value(value);
            prop_assert_eq!(note.toggled(digit).toggled(digit), note);
        }

        #[test]
        fn prop_serialized_round_trip(bits in 0u16..512) {
            let note = NoteSet::try_from_bits(bits).unwrap();
            prop_assert_eq!(note.to_string().parse::<NoteSet>().unwrap(), note);
        }
    }
}
