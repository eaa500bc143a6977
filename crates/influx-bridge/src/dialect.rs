// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! InfluxDB HTTP API dialects.
//!
//! The two supported API revisions differ in endpoint paths, the
//! `Authorization` scheme and the query parameter names used by the
//! write endpoint.
//!
//! | Version | Query path          | Write path         | Auth scheme |
//! |---------|---------------------|--------------------|-------------|
//! | `3`     | `/api/v3/query_sql` | `/api/v3/write_lp` | `Bearer`    |
//! | other   | `/api/v2/query`     | `/api/v2/write`    | `Token`     |

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// InfluxDB API version selected by a connection profile.
///
/// Only the literal `"3"` selects the v3 API. Every other value,
/// including an empty string, falls back to v2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "String")]
pub enum ApiVersion {
    /// InfluxDB 2.x (`"2.x"`).
    #[default]
    V2,
    /// InfluxDB 3 (`"3"`).
    V3,
}

impl ApiVersion {
    /// Path of the SQL query endpoint.
    pub fn query_path(self) -> &'static str {
        match self {
            Self::V2 => "/api/v2/query",
            Self::V3 => "/api/v3/query_sql",
        }
    }

    /// Path of the line protocol write endpoint.
    pub fn write_path(self) -> &'static str {
        match self {
            Self::V2 => "/api/v2/write",
            Self::V3 => "/api/v3/write_lp",
        }
    }

    /// Scheme word placed before the token in the `Authorization` header.
    pub fn auth_scheme(self) -> &'static str {
        match self {
            Self::V2 => "Token",
            Self::V3 => "Bearer",
        }
    }

    /// Full `Authorization` header value for `token`.
    pub fn authorization(self, token: &str) -> String {
        format!("{} {}", self.auth_scheme(), token)
    }

    /// Canonical configuration spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V2 => "2.x",
            Self::V3 => "3",
        }
    }
}

impl From<&str> for ApiVersion {
    fn from(s: &str) -> Self {
        if s == "3" {
            Self::V3
        } else {
            Self::V2
        }
    }
}

impl From<String> for ApiVersion {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<ApiVersion> for String {
    fn from(v: ApiVersion) -> Self {
        v.as_str().to_string()
    }
}

// YAML writes `version: 3` as an integer, so accept numbers as well.
impl<'de> Deserialize<'de> for ApiVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self::from(s),
            Raw::Integer(3) => Self::V3,
            Raw::Integer(_) | Raw::Float(_) => Self::V2,
        })
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
