// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Extra tag injection for validated Line Protocol records.
//!
//! Tags are configured as a comma-separated list of free-form values.
//! Each non-empty entry becomes a positional tag:
//!
//! ```text
//! "region=us, env=prod"  ->  ",tag_0=region\=us,tag_1=env\=prod"
//! ```
//!
//! The resulting fragment is spliced between the series and the field of
//! each record:
//!
//! ```text
//! cpu value=42.5 1690000000
//! cpu,tag_0=region\=us,tag_1=env\=prod value=42.5 1690000000
//! ```

use crate::line_protocol::FIELD_KEY;
use thiserror::Error;

/// Tag configuration or reassembly failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    /// A backslash in the value would escape one of the separators once
    /// the value is spliced into a record.
    #[error("malformed tag {index} ({value:?}): backslash before a separator or at the end")]
    DanglingEscape { index: usize, value: String },

    /// A line break would split the record across body lines.
    #[error("malformed tag {index} ({value:?}): line break in tag value")]
    LineBreak { index: usize, value: String },

    /// The record does not have the `<series> value=<n> <ts>` shape.
    #[error("cannot locate field and timestamp in {line:?}")]
    Reassembly { line: String },
}

/// Escape a tag value: `,`, ` ` and `=` are prefixed with a backslash.
pub fn escape_tag_value(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if matches!(c, ',' | ' ' | '=') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn has_dangling_escape(s: &str) -> bool {
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && matches!(chars.peek(), None | Some(',' | ' ' | '=')) {
            return true;
        }
    }
    false
}

/// Parsed extra tags, pre-rendered as a single fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraTags {
    fragment: String,
    count: usize,
}

impl ExtraTags {
    /// Parse a comma-separated tag list.
    ///
    /// Entries are trimmed and empty entries dropped before numbering, so
    /// `"a,,b"` yields `tag_0=a,tag_1=b`.
    pub fn parse(config: &str) -> Result<Self, TagError> {
        let mut fragment = String::new();
        let mut count = 0;

        for value in config.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if has_dangling_escape(value) {
                return Err(TagError::DanglingEscape {
                    index: count,
                    value: value.to_string(),
                });
            }
            if value.contains(['\n', '\r']) {
                return Err(TagError::LineBreak {
                    index: count,
                    value: value.to_string(),
                });
            }
            fragment.push_str(&format!(",tag_{}={}", count, escape_tag_value(value)));
            count += 1;
        }

        Ok(Self { fragment, count })
    }

    /// True when no tags are configured; records then pass through as-is.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of tags in the fragment.
    pub fn len(&self) -> usize {
        self.count
    }

    /// The fragment, including its leading comma (empty if no tags).
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Splice the fragment into `line`. A no-op when empty.
    pub fn apply(&self, line: &str) -> Result<String, TagError> {
        if self.is_empty() {
            return Ok(line.to_string());
        }
        inject(line, &self.fragment)
    }
}

/// Reassemble `line` with `fragment` appended to its series segment.
///
/// The timestamp is the text after the last space; the series ends at the
/// first space that precedes `value=`. Field and timestamp text are copied
/// unchanged. Running this twice appends the fragment twice.
pub fn inject(line: &str, fragment: &str) -> Result<String, TagError> {
    let reassembly = || TagError::Reassembly {
        line: line.to_string(),
    };

    let (rest, timestamp) = line.trim().rsplit_once(' ').ok_or_else(reassembly)?;
    let split = rest.find(&format!(" {}", FIELD_KEY)).ok_or_else(reassembly)?;
    let (series, field) = (&rest[..split], &rest[split + 1..]);

    Ok(format!("{}{} {} {}", series, fragment, field, timestamp)
        .trim()
        .to_string())
}
