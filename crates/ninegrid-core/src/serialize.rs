//! Board text serialization: the plain 81-digit formats and the versioned
//! tokenized formats.
//!
//! The engine performs no I/O; the host application stores and transports
//! these strings verbatim (database column, clipboard, file).

use std::fmt::{self, Display, Write as _};

use crate::note::ParseNoteError;
use crate::{Board, Digit, NoteSet, Position};

/// Supported board text formats.
///
/// Versions 1-3 are legacy formats kept for importing old saved games;
/// [`BoardFormat::V4`] is the current default output format and the only
/// versioned format carrying both corner and center notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardFormat {
    /// 81 digits describing the given clues: `0` marks an editable cell,
    /// nonzero a given value.
    Original,
    /// 81 digits of current values, `0` for empty. No notes, no
    /// editability.
    Plain,
    /// `version: 1` + per-cell `value|notes|editable|` records with
    /// comma-separated note lists.
    V1,
    /// `version: 2` + per-cell `value|notes|editable|` records with decimal
    /// bitmask notes.
    V2,
    /// Identical record shape to version 2; kept as a distinct on-disk
    /// version tag.
    V3,
    /// `version: 4` + per-cell `value|cornerNotes|centerNotes|editable|`
    /// records with decimal bitmask notes.
    V4,
}

/// Errors raised when deserializing board text.
///
/// The offending raw text (or token) is carried so the caller can show a
/// user-facing message without crashing.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseBoardError {
    /// The input matched none of the recognized formats.
    #[display("unrecognized board text: {input:?}")]
    UnrecognizedFormat {
        /// The offending input.
        input: String,
    },
    /// The `version:` header named a version this engine does not know.
    #[display("unsupported board data version: {version}")]
    UnsupportedVersion {
        /// The version number found in the header.
        version: u32,
    },
    /// A versioned payload had a structurally wrong token count.
    #[display("expected {expected} cell fields, found {found}")]
    WrongFieldCount {
        /// The expected token count for this version.
        expected: usize,
        /// The token count actually found.
        found: usize,
    },
    /// A value token was not a digit in 0-9.
    #[display("invalid cell value {token:?}")]
    InvalidValue {
        /// The offending token.
        token: String,
    },
    /// An editable flag token was not `0` or `1`.
    #[display("invalid editable flag {token:?}")]
    InvalidEditable {
        /// The offending token.
        token: String,
    },
    /// A note field failed to parse.
    #[display("invalid note field: {source}")]
    InvalidNote {
        /// The underlying note parse error.
        source: ParseNoteError,
    },
}

fn legacy_note_list(note: NoteSet) -> String {
    if note.is_empty() {
        return "-".to_owned();
    }
    let mut out = String::new();
    for digit in note.iter() {
        if !out.is_empty() {
            out.push(',');
        }
        let _ = write!(out, "{digit}");
    }
    out
}

fn value_char(value: Option<Digit>) -> char {
    value.map_or('0', Digit::to_char)
}

fn parse_value(token: &str) -> Result<Option<Digit>, ParseBoardError> {
    match token.parse::<u8>() {
        Ok(0) => Ok(None),
        Ok(v) if v <= 9 => Ok(Digit::try_from_value(v)),
        _ => Err(ParseBoardError::InvalidValue {
            token: token.to_owned(),
        }),
    }
}

fn parse_editable(token: &str) -> Result<bool, ParseBoardError> {
    match token {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(ParseBoardError::InvalidEditable {
            token: token.to_owned(),
        }),
    }
}

fn parse_note(token: &str) -> Result<NoteSet, ParseBoardError> {
    token
        .parse()
        .map_err(|source| ParseBoardError::InvalidNote { source })
}

impl Board {
    /// Serializes this board in the requested format.
    #[must_use]
    pub fn serialize(&self, format: BoardFormat) -> String {
        let mut out = String::new();
        match format {
            BoardFormat::Original => {
                for pos in Position::ALL {
                    let cell = self.cell(pos);
                    let given = if cell.is_editable() { None } else { cell.value() };
                    out.push(value_char(given));
                }
            }
            BoardFormat::Plain => {
                for pos in Position::ALL {
                    out.push(value_char(self.cell(pos).value()));
                }
            }
            BoardFormat::V1 => {
                out.push_str("version: 1\n");
                for pos in Position::ALL {
                    let cell = self.cell(pos);
                    let _ = write!(
                        out,
                        "{}|{}|{}|",
                        value_char(cell.value()),
                        legacy_note_list(cell.corner_note()),
                        u8::from(cell.is_editable()),
                    );
                }
            }
            BoardFormat::V2 | BoardFormat::V3 => {
                let version = if format == BoardFormat::V2 { 2 } else { 3 };
                let _ = writeln!(out, "version: {version}");
                for pos in Position::ALL {
                    let cell = self.cell(pos);
                    let _ = write!(
                        out,
                        "{}|{}|{}|",
                        value_char(cell.value()),
                        cell.corner_note(),
                        u8::from(cell.is_editable()),
                    );
                }
            }
            BoardFormat::V4 => {
                out.push_str("version: 4\n");
                for pos in Position::ALL {
                    let cell = self.cell(pos);
                    let _ = write!(
                        out,
                        "{}|{}|{}|{}|",
                        value_char(cell.value()),
                        cell.corner_note(),
                        cell.center_note(),
                        u8::from(cell.is_editable()),
                    );
                }
            }
        }
        out
    }

    /// Deserializes board text, auto-detecting the format.
    ///
    /// A leading `version:` line selects the versioned tokenized parser;
    /// any other input is scanned as a bare 81-digit string, skipping
    /// non-digit characters (so stray separators and line breaks are
    /// tolerated). Bare-digit input is clue text: nonzero cells become
    /// non-editable givens.
    ///
    /// Legacy editable quirk, preserved deliberately: in every versioned
    /// format a record with value `0` is treated as editable regardless of
    /// its editable flag, because old exporters wrote inconsistent flags
    /// for empty cells.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseBoardError`] describing the first structural or
    /// token-level problem found.
    pub fn deserialize(text: &str) -> Result<Self, ParseBoardError> {
        if let Some(rest) = text.strip_prefix("version:") {
            let (header, body) = rest.split_once('\n').unwrap_or((rest, ""));
            let version =
                header
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| ParseBoardError::UnrecognizedFormat {
                        input: text.to_owned(),
                    })?;
            Self::deserialize_versioned(version, body)
        } else {
            Self::deserialize_digits(text)
        }
    }

    fn deserialize_digits(text: &str) -> Result<Self, ParseBoardError> {
        let digits: Vec<Option<Digit>> = text
            .chars()
            .filter(char::is_ascii_digit)
            .map(Digit::from_char)
            .collect();
        if digits.len() != 81 {
            return Err(ParseBoardError::UnrecognizedFormat {
                input: text.to_owned(),
            });
        }
        let mut board = Self::new();
        for (pos, digit) in Position::ALL.into_iter().zip(digits) {
            board.set_value(pos, digit);
        }
        board.mark_given_cells_not_editable();
        Ok(board)
    }

    fn deserialize_versioned(version: u32, body: &str) -> Result<Self, ParseBoardError> {
        let fields_per_cell = match version {
            1..=3 => 3,
            4 => 4,
            _ => return Err(ParseBoardError::UnsupportedVersion { version }),
        };
        let body = body.trim_end();
        let mut tokens: Vec<&str> = body.split('|').collect();
        if body.ends_with('|') {
            tokens.pop();
        }
        let expected = 81 * fields_per_cell;
        if tokens.len() != expected {
            return Err(ParseBoardError::WrongFieldCount {
                expected,
                found: tokens.len(),
            });
        }

        let mut board = Self::new();
        for (pos, record) in Position::ALL.into_iter().zip(tokens.chunks(fields_per_cell)) {
            let value = parse_value(record[0])?;
            let (corner, center, editable_token) = if fields_per_cell == 4 {
                (parse_note(record[1])?, parse_note(record[2])?, record[3])
            } else {
                (parse_note(record[1])?, NoteSet::EMPTY, record[2])
            };
            // Empty cells are always editable on import (legacy quirk).
            let editable = value.is_none() || parse_editable(editable_token)?;
            board.set_value(pos, value);
            board.set_corner_note(pos, corner);
            board.set_center_note(pos, center);
            board.set_editable(pos, editable);
        }
        Ok(board)
    }

    /// Checks whether pasted or imported text is in a recognized format,
    /// without building a board.
    ///
    /// Accepts exactly the 81-digit plain pattern (surrounding whitespace
    /// allowed) or one of the four versioned formats; rejects everything
    /// else. This is stricter than [`Board::deserialize`], which tolerates
    /// stray separators in bare-digit input.
    #[must_use]
    pub fn is_recognized_format(text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.len() == 81 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return true;
        }
        trimmed.starts_with("version:") && Self::deserialize(trimmed).is_ok()
    }
}

/// Displays the default output format (version 4).
impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize(BoardFormat::V4))
    }
}
