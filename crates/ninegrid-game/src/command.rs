//! Reversible edit commands and their text encoding.

use std::fmt::Write as _;

use ninegrid_core::{Board, Digit, NoteSet, Position};

/// One cell's notes, captured before a bulk note operation so undo can
/// restore them exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedNotes {
    /// The cell the notes belong to.
    pub pos: Position,
    /// The corner note before the operation.
    pub corner: NoteSet,
    /// The center note before the operation.
    pub center: NoteSet,
}

/// One cell's center note, captured before a note auto-fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedCenterNote {
    /// The cell the note belongs to.
    pub pos: Position,
    /// The center note before the operation.
    pub center: NoteSet,
}

/// A reversible edit against a board.
///
/// Every variant stores the prior state it needs to reverse itself; the
/// capture happens when the command executes, so a command deserialized
/// from saved history (already executed in a past session) can still
/// undo.
///
/// The variant set is closed: serialization is an exhaustive `match` over
/// short tags, not a runtime type registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set or clear one cell's value.
    SetValue {
        /// The target cell.
        pos: Position,
        /// The value to place, `None` to clear.
        value: Option<Digit>,
        /// The value before execution.
        old_value: Option<Digit>,
    },
    /// Set one cell's value and strip the placed digit from all peer
    /// notes.
    SetValueAndClearPeerNotes {
        /// The target cell.
        pos: Position,
        /// The value to place, `None` to clear.
        value: Option<Digit>,
        /// The value before execution.
        old_value: Option<Digit>,
        /// Notes of the peers that held the placed digit.
        old_notes: Vec<SavedNotes>,
    },
    /// Replace one cell's corner note.
    EditCornerNote {
        /// The target cell.
        pos: Position,
        /// The new note.
        note: NoteSet,
        /// The note before execution.
        old_note: NoteSet,
    },
    /// Replace one cell's center note.
    EditCenterNote {
        /// The target cell.
        pos: Position,
        /// The new note.
        note: NoteSet,
        /// The note before execution.
        old_note: NoteSet,
    },
    /// Clear both notes of every cell.
    ClearAllNotes {
        /// Notes of the cells that had any.
        old_notes: Vec<SavedNotes>,
    },
    /// Overwrite center notes with the computed candidates
    /// ([`Board::fill_notes`]).
    FillNotes {
        /// Prior center notes of the affected cells.
        old_center: Vec<SavedCenterNote>,
    },
    /// Overwrite center notes with all nine digits
    /// ([`Board::fill_notes_all_values`]).
    FillNotesAllValues {
        /// Prior center notes of the affected cells.
        old_center: Vec<SavedCenterNote>,
    },
    /// A no-op marker delimiting a batch of moves.
    Checkpoint,
}

impl Command {
    /// Creates a set-value command.
    #[must_use]
    pub const fn set_value(pos: Position, value: Option<Digit>) -> Self {
        Self::SetValue {
            pos,
            value,
            old_value: None,
        }
    }

    /// Creates a set-value command that also strips the digit from peer
    /// notes.
    #[must_use]
    pub const fn set_value_and_clear_peer_notes(pos: Position, value: Option<Digit>) -> Self {
        Self::SetValueAndClearPeerNotes {
            pos,
            value,
            old_value: None,
            old_notes: Vec::new(),
        }
    }

    /// Creates a corner-note edit command.
    #[must_use]
    pub const fn edit_corner_note(pos: Position, note: NoteSet) -> Self {
        Self::EditCornerNote {
            pos,
            note,
            old_note: NoteSet::EMPTY,
        }
    }

    /// Creates a center-note edit command.
    #[must_use]
    pub const fn edit_center_note(pos: Position, note: NoteSet) -> Self {
        Self::EditCenterNote {
            pos,
            note,
            old_note: NoteSet::EMPTY,
        }
    }

    /// Creates a clear-all-notes command.
    #[must_use]
    pub const fn clear_all_notes() -> Self {
        Self::ClearAllNotes {
            old_notes: Vec::new(),
        }
    }

    /// Creates a fill-notes command.
    #[must_use]
    pub const fn fill_notes() -> Self {
        Self::FillNotes {
            old_center: Vec::new(),
        }
    }

    /// Creates a fill-notes-with-all-values command.
    #[must_use]
    pub const fn fill_notes_all_values() -> Self {
        Self::FillNotesAllValues {
            old_center: Vec::new(),
        }
    }

    /// Creates a checkpoint marker.
    #[must_use]
    pub const fn checkpoint() -> Self {
        Self::Checkpoint
    }

    /// Returns `true` for the checkpoint marker.
    #[must_use]
    pub const fn is_checkpoint(&self) -> bool {
        matches!(self, Self::Checkpoint)
    }

    /// Returns the single cell this command targets, if it targets one.
    #[must_use]
    pub const fn target_cell(&self) -> Option<Position> {
        match self {
            Self::SetValue { pos, .. }
            | Self::SetValueAndClearPeerNotes { pos, .. }
            | Self::EditCornerNote { pos, .. }
            | Self::EditCenterNote { pos, .. } => Some(*pos),
            Self::ClearAllNotes { .. }
            | Self::FillNotes { .. }
            | Self::FillNotesAllValues { .. }
            | Self::Checkpoint => None,
        }
    }

    /// Runs the command against `board`, capturing prior state for undo.
    pub(crate) fn execute(&mut self, board: &mut Board) {
        match self {
            Self::SetValue {
                pos,
                value,
                old_value,
            } => {
                *old_value = board.cell(*pos).value();
                board.set_value(*pos, *value);
            }
            Self::SetValueAndClearPeerNotes {
                pos,
                value,
                old_value,
                old_notes,
            } => {
                *old_value = board.cell(*pos).value();
                old_notes.clear();
                if let Some(digit) = *value {
                    for peer in pos.peers() {
                        let cell = board.cell(peer);
                        if cell.corner_note().contains(digit)
                            || cell.center_note().contains(digit)
                        {
                            old_notes.push(SavedNotes {
                                pos: peer,
                                corner: cell.corner_note(),
                                center: cell.center_note(),
                            });
                        }
                    }
                }
                let mut batch = board.batch();
                batch.set_value(*pos, *value);
                if let Some(digit) = *value {
                    batch.remove_notes_for_placed_digit(*pos, digit);
                }
            }
            Self::EditCornerNote {
                pos,
                note,
                old_note,
            } => {
                *old_note = board.cell(*pos).corner_note();
                board.set_corner_note(*pos, *note);
            }
            Self::EditCenterNote {
                pos,
                note,
                old_note,
            } => {
                *old_note = board.cell(*pos).center_note();
                board.set_center_note(*pos, *note);
            }
            Self::ClearAllNotes { old_notes } => {
                old_notes.clear();
                for pos in Position::ALL {
                    let cell = board.cell(pos);
                    if cell.has_notes() {
                        old_notes.push(SavedNotes {
                            pos,
                            corner: cell.corner_note(),
                            center: cell.center_note(),
                        });
                    }
                }
                let mut batch = board.batch();
                for pos in Position::ALL {
                    batch.set_corner_note(pos, NoteSet::EMPTY);
                    batch.set_center_note(pos, NoteSet::EMPTY);
                }
            }
            Self::FillNotes { old_center } => {
                Self::capture_fill_targets(board, old_center);
                board.fill_notes();
            }
            Self::FillNotesAllValues { old_center } => {
                Self::capture_fill_targets(board, old_center);
                board.fill_notes_all_values();
            }
            Self::Checkpoint => {}
        }
    }

    fn capture_fill_targets(board: &Board, old_center: &mut Vec<SavedCenterNote>) {
        old_center.clear();
        for pos in Position::ALL {
            let cell = board.cell(pos);
            if cell.is_editable() && cell.is_empty() {
                old_center.push(SavedCenterNote {
                    pos,
                    center: cell.center_note(),
                });
            }
        }
    }

    /// Restores the board state this command replaced.
    pub(crate) fn undo(&self, board: &mut Board) {
        match self {
            Self::SetValue { pos, old_value, .. } => {
                board.set_value(*pos, *old_value);
            }
            Self::SetValueAndClearPeerNotes {
                pos,
                old_value,
                old_notes,
                ..
            } => {
                let mut batch = board.batch();
                batch.set_value(*pos, *old_value);
                for saved in old_notes {
                    batch.set_corner_note(saved.pos, saved.corner);
                    batch.set_center_note(saved.pos, saved.center);
                }
            }
            Self::EditCornerNote { pos, old_note, .. } => {
                board.set_corner_note(*pos, *old_note);
            }
            Self::EditCenterNote { pos, old_note, .. } => {
                board.set_center_note(*pos, *old_note);
            }
            Self::ClearAllNotes { old_notes } => {
                let mut batch = board.batch();
                for saved in old_notes {
                    batch.set_corner_note(saved.pos, saved.corner);
                    batch.set_center_note(saved.pos, saved.center);
                }
            }
            Self::FillNotes { old_center } | Self::FillNotesAllValues { old_center } => {
                let mut batch = board.batch();
                for saved in old_center {
                    batch.set_center_note(saved.pos, saved.center);
                }
            }
            Self::Checkpoint => {}
        }
    }

    /// Appends this command's tag and fields, each terminated by `|`.
    pub(crate) fn write_to(&self, out: &mut String) {
        match self {
            Self::SetValue {
                pos,
                value,
                old_value,
            } => {
                let _ = write!(
                    out,
                    "sv|{}|{}|{}|{}|",
                    pos.row(),
                    pos.col(),
                    encode_value(*value),
                    encode_value(*old_value),
                );
            }
            Self::SetValueAndClearPeerNotes {
                pos,
                value,
                old_value,
                old_notes,
            } => {
                let _ = write!(
                    out,
                    "sp|{}|{}|{}|{}|{}|",
                    pos.row(),
                    pos.col(),
                    encode_value(*value),
                    encode_value(*old_value),
                    old_notes.len(),
                );
                for saved in old_notes {
                    let _ = write!(
                        out,
                        "{}|{}|{}|{}|",
                        saved.pos.row(),
                        saved.pos.col(),
                        saved.corner,
                        saved.center,
                    );
                }
            }
            Self::EditCornerNote {
                pos,
                note,
                old_note,
            } => {
                let _ = write!(
                    out,
                    "nc|{}|{}|{}|{}|",
                    pos.row(),
                    pos.col(),
                    note,
                    old_note
                );
            }
            Self::EditCenterNote {
                pos,
                note,
                old_note,
            } => {
                let _ = write!(
                    out,
                    "nn|{}|{}|{}|{}|",
                    pos.row(),
                    pos.col(),
                    note,
                    old_note
                );
            }
            Self::ClearAllNotes { old_notes } => {
                let _ = write!(out, "ca|{}|", old_notes.len());
                for saved in old_notes {
                    let _ = write!(
                        out,
                        "{}|{}|{}|{}|",
                        saved.pos.row(),
                        saved.pos.col(),
                        saved.corner,
                        saved.center,
                    );
                }
            }
            Self::FillNotes { old_center } => {
                Self::write_fill(out, "fn", old_center);
            }
            Self::FillNotesAllValues { old_center } => {
                Self::write_fill(out, "fa", old_center);
            }
            Self::Checkpoint => out.push_str("cp|"),
        }
    }

    fn write_fill(out: &mut String, tag: &str, old_center: &[SavedCenterNote]) {
        let _ = write!(out, "{tag}|{}|", old_center.len());
        for saved in old_center {
            let _ = write!(
                out,
                "{}|{}|{}|",
                saved.pos.row(),
                saved.pos.col(),
                saved.center
            );
        }
    }

    /// Reconstructs one command from its tag and fields.
    ///
    /// An unknown tag is a hard parse error: the tag set is fixed.
    pub(crate) fn read_from(tokens: &mut Tokens<'_>) -> Result<Self, ParseHistoryError> {
        let tag = tokens.next()?;
        match tag {
            "sv" => Ok(Self::SetValue {
                pos: tokens.next_position()?,
                value: tokens.next_value()?,
                old_value: tokens.next_value()?,
            }),
            "sp" => {
                let pos = tokens.next_position()?;
                let value = tokens.next_value()?;
                let old_value = tokens.next_value()?;
                let count = tokens.next_len()?;
                let mut old_notes = Vec::with_capacity(count);
                for _ in 0..count {
                    old_notes.push(SavedNotes {
                        pos: tokens.next_position()?,
                        corner: tokens.next_note()?,
                        center: tokens.next_note()?,
                    });
                }
                Ok(Self::SetValueAndClearPeerNotes {
                    pos,
                    value,
                    old_value,
                    old_notes,
                })
            }
            "nc" => Ok(Self::EditCornerNote {
                pos: tokens.next_position()?,
                note: tokens.next_note()?,
                old_note: tokens.next_note()?,
            }),
            "nn" => Ok(Self::EditCenterNote {
                pos: tokens.next_position()?,
                note: tokens.next_note()?,
                old_note: tokens.next_note()?,
            }),
            "ca" => {
                let count = tokens.next_len()?;
                let mut old_notes = Vec::with_capacity(count);
                for _ in 0..count {
                    old_notes.push(SavedNotes {
                        pos: tokens.next_position()?,
                        corner: tokens.next_note()?,
                        center: tokens.next_note()?,
                    });
                }
                Ok(Self::ClearAllNotes { old_notes })
            }
            "fn" => Ok(Self::FillNotes {
                old_center: Self::read_fill(tokens)?,
            }),
            "fa" => Ok(Self::FillNotesAllValues {
                old_center: Self::read_fill(tokens)?,
            }),
            "cp" => Ok(Self::Checkpoint),
            tag => Err(ParseHistoryError::UnknownTag {
                tag: tag.to_owned(),
            }),
        }
    }

    fn read_fill(tokens: &mut Tokens<'_>) -> Result<Vec<SavedCenterNote>, ParseHistoryError> {
        let count = tokens.next_len()?;
        let mut old_center = Vec::with_capacity(count);
        for _ in 0..count {
            old_center.push(SavedCenterNote {
                pos: tokens.next_position()?,
                center: tokens.next_note()?,
            });
        }
        Ok(old_center)
    }
}

const fn encode_value(value: Option<Digit>) -> u8 {
    match value {
        Some(digit) => digit.value(),
        None => 0,
    }
}

/// Errors raised when parsing serialized history text.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseHistoryError {
    /// A command tag matched no known command.
    #[display("unknown command tag {tag:?}")]
    UnknownTag {
        /// The offending tag.
        tag: String,
    },
    /// The text ended before all announced fields were read.
    #[display("unexpected end of history text")]
    UnexpectedEnd,
    /// A field failed to parse as the expected type.
    #[display("invalid history field {token:?}")]
    InvalidField {
        /// The offending token.
        token: String,
    },
    /// Tokens remained after the announced command count was read.
    #[display("trailing data after {count} commands")]
    TrailingData {
        /// The announced command count.
        count: usize,
    },
}

/// Cursor over `|`-delimited history tokens.
pub(crate) struct Tokens<'a> {
    iter: std::str::Split<'a, char>,
}

impl<'a> Tokens<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            iter: text.split('|'),
        }
    }

    pub(crate) fn next(&mut self) -> Result<&'a str, ParseHistoryError> {
        self.iter.next().ok_or(ParseHistoryError::UnexpectedEnd)
    }

    /// Accepts only the trailing empty token (after the final `|`) or
    /// nothing; anything else is trailing data.
    pub(crate) fn finish(mut self, count: usize) -> Result<(), ParseHistoryError> {
        let trailing = self.iter.next();
        let rest = self.iter.next();
        match (trailing, rest) {
            (None, _) | (Some(""), None) => Ok(()),
            _ => Err(ParseHistoryError::TrailingData { count }),
        }
    }

    pub(crate) fn next_len(&mut self) -> Result<usize, ParseHistoryError> {
        let token = self.next()?;
        let len = token
            .parse::<usize>()
            .map_err(|_| ParseHistoryError::InvalidField {
                token: token.to_owned(),
            })?;
        // A single command can touch at most the whole board.
        if len > 81 {
            return Err(ParseHistoryError::InvalidField {
                token: token.to_owned(),
            });
        }
        Ok(len)
    }

    pub(crate) fn next_position(&mut self) -> Result<Position, ParseHistoryError> {
        let row_token = self.next()?;
        let row = parse_index(row_token)?;
        let col = parse_index(self.next()?)?;
        Ok(Position::new(row, col))
    }

    pub(crate) fn next_value(&mut self) -> Result<Option<Digit>, ParseHistoryError> {
        let token = self.next()?;
        match token.parse::<u8>() {
            Ok(0) => Ok(None),
            Ok(v) if v <= 9 => Ok(Digit::try_from_value(v)),
            _ => Err(ParseHistoryError::InvalidField {
                token: token.to_owned(),
            }),
        }
    }

    pub(crate) fn next_note(&mut self) -> Result<NoteSet, ParseHistoryError> {
        let token = self.next()?;
        token.parse().map_err(|_| ParseHistoryError::InvalidField {
            token: token.to_owned(),
        })
    }
}

fn parse_index(token: &str) -> Result<u8, ParseHistoryError> {
    match token.parse::<u8>() {
        Ok(i) if i < 9 => Ok(i),
        _ => Err(ParseHistoryError::InvalidField {
            token: token.to_owned(),
        }),
    }
}
