// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transport-agnostic HTTP request descriptors.
//!
//! Builders return a [`RequestDescriptor`]; nothing here performs I/O.
//! Hosts that expect the descriptor on the message itself use
//! [`RequestDescriptor::attach_to`].

use crate::message::{keys, Message};
use crate::profile::ConnectionProfile;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const ACCEPT: &str = "Accept";

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header name to value, kept sorted for stable output.
pub type Headers = BTreeMap<String, String>;

/// A fully formed request, ready for an external HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: Method,
    pub headers: Headers,
    /// Request body; `None` for GET.
    pub body: Option<String>,
    /// Timeout the transport should honour, in milliseconds.
    pub timeout_ms: u64,
}

impl RequestDescriptor {
    fn new(method: Method, url: String, body: Option<String>) -> Self {
        Self {
            url,
            method,
            headers: Headers::new(),
            body,
            timeout_ms: 0,
        }
    }

    /// GET without a body.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url.into(), None)
    }

    /// POST with `body`.
    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(Method::Post, url.into(), Some(body.into()))
    }

    /// Add or replace a header.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_string(), value.into());
        self
    }

    /// Set the timeout in milliseconds.
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Header value by exact name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Copy the descriptor onto `msg` as `url`, `method`, `headers`,
    /// `payload` and `timeout`.
    pub fn attach_to(&self, msg: &mut Message) {
        let headers: serde_json::Map<String, Value> = self
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        msg.set(keys::URL, self.url.clone());
        msg.set(keys::METHOD, self.method.as_str());
        msg.set(keys::HEADERS, Value::Object(headers));
        msg.set(
            keys::PAYLOAD,
            self.body.clone().map_or(Value::Null, Value::String),
        );
        msg.set(keys::TIMEOUT, self.timeout_ms);
    }
}

/// `base_url + path + "?" + k=v&...` with keys and values percent-encoded.
pub(crate) fn endpoint_url(
    profile: &ConnectionProfile,
    path: &str,
    params: &[(&str, &str)],
) -> String {
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}{}?{}", profile.base_url(), path, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let d = RequestDescriptor::post("http://h:1/w", "body")
            .header(CONTENT_TYPE, "text/plain")
            .timeout_ms(5000);
        assert_eq!(d.method, Method::Post);
        assert_eq!(d.body.as_deref(), Some("body"));
        assert_eq!(d.header_value(CONTENT_TYPE), Some("text/plain"));
        assert_eq!(d.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_attach_to_message() {
        let mut msg = Message::new().with("topic", "keep-me").with("payload", json!(["x"]));
        RequestDescriptor::get("http://h:1/q")
            .header(ACCEPT, "application/json")
            .timeout_ms(30000)
            .attach_to(&mut msg);

        assert_eq!(
            msg.into_value(),
            json!({
                "topic": "keep-me",
                "url": "http://h:1/q",
                "method": "GET",
                "headers": {"Accept": "application/json"},
                "payload": null,
                "timeout": 30000
            })
        );
    }

    #[test]
    fn test_endpoint_url_encodes_params() {
        let profile = ConnectionProfile::new("h", "db");
        let url = endpoint_url(&profile, "/p", &[("db", "my db"), ("q", "a&b=c")]);
        assert_eq!(url, "http://h:8086/p?db=my%20db&q=a%26b%3Dc");
    }

    #[test]
    fn test_method_serializes_uppercase() {
        assert_eq!(serde_json::to_value(Method::Post).expect("json"), json!("POST"));
    }
}
