// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy shared by the query and write pipelines.
//!
//! Fatal errors are [`RequestError`]s: no descriptor is produced. A
//! rejected payload element is a [`RecordWarning`]: the element is dropped
//! and the pipeline keeps going.

use crate::line_protocol::LineError;
use crate::tags::TagError;
use std::fmt;
use thiserror::Error;

/// Error class, used to route errors without matching on variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing profile or token.
    Config,
    /// Structurally invalid message input.
    Input,
    /// Anything else raised while building a descriptor.
    Unexpected,
}

/// Fatal error for a single pipeline invocation.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{reason}")]
    Config { reason: String },

    #[error("{reason} ({field}: {value})")]
    Input {
        /// Offending message field (e.g. `timeSpan`, `payload`).
        field: &'static str,
        /// Offending value, rendered for diagnostics.
        value: String,
        reason: String,
    },

    #[error("Failed to prepare request: {0}")]
    Unexpected(String),
}

impl RequestError {
    /// Configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Input error for `field` holding `value`.
    pub fn input(field: &'static str, value: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::Input {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Error class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } => ErrorKind::Config,
            Self::Input { .. } => ErrorKind::Input,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// Message field the error refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Input { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(e: serde_json::Error) -> Self {
        Self::Unexpected(e.to_string())
    }
}

impl From<TagError> for RequestError {
    fn from(e: TagError) -> Self {
        Self::Unexpected(e.to_string())
    }
}

/// Why a payload element was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordIssue {
    /// The element is not a string (JSON type name attached).
    WrongType(&'static str),
    /// The string failed line protocol validation.
    Invalid(LineError),
}

/// Non-fatal diagnostic for one dropped payload element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordWarning {
    /// Position of the element in the payload array.
    pub index: usize,
    /// The element as received (JSON-encoded when it is not a string).
    pub record: String,
    pub issue: RecordIssue,
}

impl fmt::Display for RecordWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.issue {
            RecordIssue::WrongType(ty) => write!(
                f,
                "Invalid line type at index {}: {}, value: {}",
                self.index, ty, self.record
            ),
            RecordIssue::Invalid(err) => write!(
                f,
                "Invalid line format at index {}: {} ({})",
                self.index, self.record, err
            ),
        }
    }
}
