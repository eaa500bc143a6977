// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Inbound message model.
//!
//! Messages are loosely typed JSON objects handed over by the host. The
//! pipelines read a handful of well-known keys:
//!
//! | Key                 | Pipeline | Meaning                              |
//! |---------------------|----------|--------------------------------------|
//! | `table`             | query    | table name, overrides node setting   |
//! | `timeSpan`          | query    | window length in seconds             |
//! | `req.query.timeSpan`| query    | window length from an HTTP request   |
//! | `payload`           | write    | array of candidate records           |
//! | `tags`              | write    | comma-separated extra tags           |
//! | `timeout`           | both     | transport timeout override (ms)      |

use crate::error::RequestError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known message keys.
pub mod keys {
    pub const TABLE: &str = "table";
    pub const TIME_SPAN: &str = "timeSpan";
    pub const REQ: &str = "req";
    pub const QUERY: &str = "query";
    pub const PAYLOAD: &str = "payload";
    pub const TAGS: &str = "tags";
    pub const TIMEOUT: &str = "timeout";
    pub const URL: &str = "url";
    pub const METHOD: &str = "method";
    pub const HEADERS: &str = "headers";
    pub const BUCKET: &str = "bucket";
}

/// A host message: a JSON object with arbitrary extra keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(Map<String, Value>);

impl Message {
    /// Empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, RequestError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(RequestError::input(
                "msg",
                json_type(&other),
                "Invalid message: expected a JSON object",
            )),
        }
    }

    /// Parse a message from JSON text.
    pub fn from_json(text: &str) -> Result<Self, RequestError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| RequestError::input("msg", e, "Invalid message JSON"))?;
        Self::from_value(value)
    }

    /// Builder-style setter.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Set `key`, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Raw value of `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// `key` as a non-empty string.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// `req.query.<key>`, as set by an HTTP-in host node.
    pub fn request_query(&self, key: &str) -> Option<&Value> {
        self.get(keys::REQ)?.get(keys::QUERY)?.get(key)
    }

    /// Positive integer `timeout` override in milliseconds.
    ///
    /// Anything else (missing, zero, negative, fractional, non-numeric)
    /// means "no override".
    pub fn timeout_override(&self) -> Option<u64> {
        match self.get(keys::TIMEOUT)? {
            Value::Number(n) => n.as_u64().filter(|&ms| ms > 0),
            Value::String(s) => s.trim().parse::<u64>().ok().filter(|&ms| ms > 0),
            _ => None,
        }
    }

    /// Convert back into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Message {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// JSON type name, for diagnostics.
pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
