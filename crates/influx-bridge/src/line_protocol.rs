// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Validating filter for single-field Line Protocol records.
//!
//! Only a constrained subset of Line Protocol is accepted:
//!
//! ```text
//! <series> value=<number> <timestamp>
//! ```
//!
//! - `series`: one or more characters, where `,`, ` ` and `=` must be
//!   escaped with a backslash and a backslash may only escape one of them
//! - `number`: ASCII digits with at most one decimal point
//! - `timestamp`: ASCII digits (Unix epoch integer)
//!
//! Exactly one space separates the series from `value=` and the number
//! from the timestamp. Nothing may follow the timestamp.
//!
//! The grammar is checked by a hand-written scanner rather than a
//! composite regular expression so that every rejection can name the
//! failing component and its column.

use thiserror::Error;

/// The only field key accepted by the filter.
pub const FIELD_KEY: &str = "value=";

/// Reason a line was rejected. Columns are 1-based character positions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("empty line")]
    Empty,

    #[error("missing measurement before column {column}")]
    MissingMeasurement { column: usize },

    #[error("backslash at column {column} must escape ',', ' ' or '=' (found {})", describe(.found))]
    InvalidEscape { column: usize, found: Option<char> },

    #[error("unescaped '{found}' at column {column}")]
    UnescapedSpecial { column: usize, found: char },

    #[error("line break at column {column}")]
    LineBreak { column: usize },

    #[error("expected \"value=\" at column {column}")]
    MissingField { column: usize },

    #[error("invalid field value at column {column} (found {})", describe(.found))]
    InvalidFieldValue { column: usize, found: Option<char> },

    #[error("second decimal point in field value at column {column}")]
    ExtraDecimalPoint { column: usize },

    #[error("missing timestamp at column {column}")]
    MissingTimestamp { column: usize },

    #[error("invalid timestamp at column {column} (found '{found}')")]
    InvalidTimestamp { column: usize, found: char },

    #[error("unexpected data after timestamp at column {column}")]
    TrailingData { column: usize },
}

fn describe(found: &Option<char>) -> String {
    match found {
        Some(c) => format!("{:?}", c),
        None => "end of line".to_string(),
    }
}

/// A line that passed validation, with the boundaries of its three
/// segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedLine<'a> {
    line: &'a str,
    series_end: usize,
    field_end: usize,
}

impl<'a> ValidatedLine<'a> {
    /// The whole line.
    pub fn as_str(&self) -> &'a str {
        self.line
    }

    /// Measurement plus any escaped tag text, without the trailing space.
    pub fn series(&self) -> &'a str {
        &self.line[..self.series_end]
    }

    /// The `value=<number>` segment.
    pub fn field(&self) -> &'a str {
        &self.line[self.series_end + 1..self.field_end]
    }

    /// The numeric part of the field segment.
    pub fn value(&self) -> &'a str {
        &self.field()[FIELD_KEY.len()..]
    }

    /// The timestamp digits.
    pub fn timestamp(&self) -> &'a str {
        &self.line[self.field_end + 1..]
    }
}

/// Character cursor that tracks byte offset and column together.
struct Cursor<'a> {
    line: &'a str,
    pos: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            line,
            pos: 0,
            column: 1,
        }
    }

    fn rest(&self) -> &'a str {
        &self.line[self.pos..]
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.rest().chars().next()?;
        self.pos += c.len_utf8();
        self.column += 1;
        Some(c)
    }

    /// Skip an ASCII literal already checked with `starts_with`.
    fn skip_ascii(&mut self, literal: &str) {
        self.pos += literal.len();
        self.column += literal.len();
    }
}

/// Validate one candidate line.
///
/// The line is checked as given; callers that accept padded input trim it
/// first.
pub fn validate(line: &str) -> Result<ValidatedLine<'_>, LineError> {
    if line.is_empty() {
        return Err(LineError::Empty);
    }

    let mut cur = Cursor::new(line);

    // Series: measurement and escaped tag text, up to the first bare space.
    let mut series_chars = 0usize;
    loop {
        let column = cur.column;
        match cur.bump() {
            None => return Err(LineError::MissingField { column }),
            Some(' ') if series_chars == 0 => {
                return Err(LineError::MissingMeasurement { column });
            }
            Some(' ') => break,
            Some('\\') => match cur.bump() {
                Some(',' | ' ' | '=') => series_chars += 1,
                found => return Err(LineError::InvalidEscape { column, found }),
            },
            Some(found @ (',' | '=')) => {
                return Err(LineError::UnescapedSpecial { column, found });
            }
            Some('\n' | '\r') => return Err(LineError::LineBreak { column }),
            Some(_) => series_chars += 1,
        }
    }
    let series_end = cur.pos - 1;

    if !cur.rest().starts_with(FIELD_KEY) {
        return Err(LineError::MissingField { column: cur.column });
    }
    cur.skip_ascii(FIELD_KEY);

    let mut digits = 0usize;
    let mut seen_dot = false;
    loop {
        let column = cur.column;
        match cur.bump() {
            None if digits == 0 => {
                return Err(LineError::InvalidFieldValue { column, found: None });
            }
            None => return Err(LineError::MissingTimestamp { column }),
            Some(' ') if digits == 0 => {
                return Err(LineError::InvalidFieldValue {
                    column,
                    found: Some(' '),
                });
            }
            Some(' ') => break,
            Some('0'..='9') => digits += 1,
            Some('.') if seen_dot => return Err(LineError::ExtraDecimalPoint { column }),
            Some('.') => seen_dot = true,
            found => return Err(LineError::InvalidFieldValue { column, found }),
        }
    }
    let field_end = cur.pos - 1;

    let mut timestamp_digits = 0usize;
    loop {
        let column = cur.column;
        match cur.bump() {
            None => break,
            Some('0'..='9') => timestamp_digits += 1,
            Some(found) if timestamp_digits == 0 => {
                return Err(LineError::InvalidTimestamp { column, found });
            }
            Some(_) => return Err(LineError::TrailingData { column }),
        }
    }
    if timestamp_digits == 0 {
        return Err(LineError::MissingTimestamp { column: cur.column });
    }

    Ok(ValidatedLine {
        line,
        series_end,
        field_end,
    })
}

/// Shorthand for `validate(line).is_ok()`.
pub fn is_valid(line: &str) -> bool {
    validate(line).is_ok()
}
