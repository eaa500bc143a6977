// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Line Protocol write requests.
//!
//! ```text
//! payload[] --> filter_records --> ExtraTags::apply --> join("\n") --> POST descriptor
//!                    |
//!                    +--> RecordWarning (dropped element, processing continues)
//! ```

use crate::descriptor::{endpoint_url, RequestDescriptor, AUTHORIZATION, CONTENT_TYPE};
use crate::dialect::ApiVersion;
use crate::error::{RecordIssue, RecordWarning, RequestError};
use crate::line_protocol;
use crate::message::{json_type, keys, Message};
use crate::profile::{require_profile, ConnectionProfile};
use crate::tags::ExtraTags;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Default transport timeout for writes.
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 5_000;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Node-level write settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteSettings {
    /// Comma-separated extra tags; empty disables injection.
    #[serde(default)]
    pub tags: String,

    /// Transport timeout; `None` uses [`DEFAULT_WRITE_TIMEOUT_MS`].
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl WriteSettings {
    /// Settings with extra tags.
    pub fn with_tags(tags: impl Into<String>) -> Self {
        Self {
            tags: tags.into(),
            ..Default::default()
        }
    }
}

/// Records that passed validation plus diagnostics for the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredRecords {
    /// Valid lines in payload order, exactly as received.
    pub lines: Vec<String>,
    pub warnings: Vec<RecordWarning>,
}

/// Validate every payload element, keeping the valid ones.
///
/// Non-string elements and strings that fail the grammar become warnings.
/// Surrounding whitespace is ignored for validation only; a kept record
/// is the original string, unchanged.
pub fn filter_records(payload: &[Value]) -> FilteredRecords {
    let mut out = FilteredRecords::default();

    for (index, element) in payload.iter().enumerate() {
        let Some(text) = element.as_str() else {
            out.warnings.push(RecordWarning {
                index,
                record: element.to_string(),
                issue: RecordIssue::WrongType(json_type(element)),
            });
            continue;
        };

        match line_protocol::validate(text.trim()) {
            Ok(_) => out.lines.push(text.to_string()),
            Err(e) => out.warnings.push(RecordWarning {
                index,
                record: text.to_string(),
                issue: RecordIssue::Invalid(e),
            }),
        }
    }

    out
}

/// A built write request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub descriptor: RequestDescriptor,
    /// Lines in the body, after tag injection.
    pub lines: Vec<String>,
    /// Dropped payload elements.
    pub warnings: Vec<RecordWarning>,
}

impl WriteRequest {
    /// Attach the descriptor to `msg`; `payload` becomes the body text.
    pub fn attach_to(&self, msg: &mut Message) {
        self.descriptor.attach_to(msg);
    }
}

/// Builds POST descriptors for the write endpoint.
#[derive(Debug, Clone, Default)]
pub struct LineProtocolWriter {
    settings: WriteSettings,
}

impl LineProtocolWriter {
    pub fn new(settings: WriteSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &WriteSettings {
        &self.settings
    }

    /// Build the write request for `msg` against `profile`.
    ///
    /// `msg.tags`, when a non-empty string, replaces the node's tags.
    pub fn build(
        &self,
        msg: &Message,
        profile: Option<&ConnectionProfile>,
    ) -> Result<WriteRequest, RequestError> {
        let profile = require_profile(profile)?;
        let authorization = profile.authorization()?;

        let payload = match msg.get(keys::PAYLOAD) {
            Some(Value::Array(items)) => items,
            other => {
                return Err(RequestError::input(
                    keys::PAYLOAD,
                    other.map_or("missing", json_type),
                    "Invalid payload: Expected array of line protocol strings",
                ));
            }
        };

        let FilteredRecords { lines, warnings } = filter_records(payload);
        for warning in &warnings {
            warn!(index = warning.index, "{}", warning);
        }
        if lines.is_empty() {
            return Err(RequestError::input(
                keys::PAYLOAD,
                format!("{} element(s), none valid", payload.len()),
                "No valid line protocol strings in payload",
            ));
        }

        let tags = ExtraTags::parse(msg.text(keys::TAGS).unwrap_or(self.settings.tags.as_str()))?;
        let lines = if tags.is_empty() {
            lines
        } else {
            lines
                .iter()
                .map(|line| tags.apply(line))
                .collect::<Result<Vec<_>, _>>()?
        };

        let url = write_url(profile);
        let timeout_ms = msg
            .timeout_override()
            .or(self.settings.timeout_ms)
            .unwrap_or(DEFAULT_WRITE_TIMEOUT_MS);

        let descriptor = RequestDescriptor::post(url, lines.join("\n"))
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_TYPE, TEXT_PLAIN)
            .timeout_ms(timeout_ms);

        debug!(
            lines = lines.len(),
            dropped = warnings.len(),
            tags = tags.len(),
            version = %profile.version,
            "built write request"
        );

        Ok(WriteRequest {
            descriptor,
            lines,
            warnings,
        })
    }
}

fn write_url(profile: &ConnectionProfile) -> String {
    let path = profile.version.write_path();
    match profile.version {
        ApiVersion::V3 => endpoint_url(profile, path, &[("db", profile.database.as_str())]),
        ApiVersion::V2 => endpoint_url(
            profile,
            path,
            &[
                ("org", profile.org.as_str()),
                ("bucket", profile.database.as_str()),
                ("precision", "ns"),
            ],
        ),
    }
}
