// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Connection profile shared by the query and write pipelines.

use crate::dialect::ApiVersion;
use crate::error::RequestError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Connection and authentication parameters for one InfluxDB instance.
///
/// A profile is created by the configuration layer and handed to the
/// pipelines by reference. The core never mutates it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    /// Host name or IP address.
    pub host: String,

    /// TCP port. Accepts an integer or a string in configuration files.
    #[serde(deserialize_with = "port_from_any", default = "default_port")]
    pub port: String,

    /// Database (v3) or bucket (v2) name.
    #[serde(default)]
    pub database: String,

    /// Organization, used by the v2 write endpoint only.
    #[serde(default)]
    pub org: String,

    /// API version (`"2.x"` or `"3"`).
    #[serde(default)]
    pub version: ApiVersion,

    /// Authentication token. Empty means the profile is unusable.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,

    /// Use `https` instead of `http`.
    #[serde(default)]
    pub tls: bool,
}

fn default_port() -> String {
    "8086".to_string()
}

fn port_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s.trim().to_string(),
    })
}

impl ConnectionProfile {
    /// Create a v2 profile with the default port and no token.
    pub fn new(host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            database: database.into(),
            org: String::new(),
            version: ApiVersion::V2,
            token: String::new(),
            tls: false,
        }
    }

    /// Set the port.
    pub fn port(mut self, port: impl ToString) -> Self {
        self.port = port.to_string();
        self
    }

    /// Set the organization.
    pub fn org(mut self, org: impl Into<String>) -> Self {
        self.org = org.into();
        self
    }

    /// Set the API version.
    pub fn version(mut self, version: ApiVersion) -> Self {
        self.version = version;
        self
    }

    /// Set the token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Enable or disable TLS.
    pub fn tls(mut self, enabled: bool) -> Self {
        self.tls = enabled;
        self
    }

    /// `scheme://host:port`, without a trailing slash.
    pub fn base_url(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    /// Return the token, or a configuration error if it is empty.
    pub fn require_token(&self) -> Result<&str, RequestError> {
        if self.token.trim().is_empty() {
            return Err(RequestError::config(
                "No token provided in InfluxDB configuration",
            ));
        }
        Ok(&self.token)
    }

    /// `Authorization` header value for this profile's dialect.
    pub fn authorization(&self) -> Result<String, RequestError> {
        let token = self.require_token()?;
        Ok(self.version.authorization(token))
    }
}

/// Resolve the attached profile, failing when none is attached.
pub(crate) fn require_profile(
    profile: Option<&ConnectionProfile>,
) -> Result<&ConnectionProfile, RequestError> {
    profile.ok_or_else(|| RequestError::config("No InfluxDB configuration defined"))
}

// Keeps the token out of logs and panic messages.
impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("org", &self.org)
            .field("version", &self.version)
            .field("token", &if self.token.is_empty() { "<empty>" } else { "<redacted>" })
            .field("tls", &self.tls)
            .finish()
    }
}
