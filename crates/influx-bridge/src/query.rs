// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Time-windowed SQL query requests.
//!
//! ```text
//! SELECT * FROM "<table>" WHERE time >= now() - INTERVAL '<secs> SECOND' ORDER BY time
//! ```
//!
//! The table name is embedded verbatim between double quotes. It is not
//! escaped, so a table name containing `"` changes the statement. Existing
//! deployments rely on this exact text; sanitize table names upstream if
//! they come from untrusted sources.

use crate::descriptor::{endpoint_url, RequestDescriptor, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use crate::error::RequestError;
use crate::message::{json_type, keys, Message};
use crate::profile::{require_profile, ConnectionProfile};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Sentinel table name meaning "not configured".
pub const UNSET_TABLE: &str = "Undefined";

/// Default window: one week.
pub const DEFAULT_TIME_SPAN_SECS: i64 = 604_800;

/// Default transport timeout for queries.
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 30_000;

const JSON: &str = "application/json";

/// Node-level query settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySettings {
    /// Table used when the message does not name one.
    #[serde(default = "default_table")]
    pub table: String,

    /// Window length when neither the message nor the request supplies one.
    #[serde(default = "default_time_span")]
    pub default_time_span: i64,

    /// Transport timeout; `None` uses [`DEFAULT_QUERY_TIMEOUT_MS`].
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_table() -> String {
    UNSET_TABLE.to_string()
}

fn default_time_span() -> i64 {
    DEFAULT_TIME_SPAN_SECS
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            table: default_table(),
            default_time_span: DEFAULT_TIME_SPAN_SECS,
            timeout_ms: None,
        }
    }
}

impl QuerySettings {
    /// Settings with a default table.
    pub fn for_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }
}

/// Which source supplied the time span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSpanSource {
    /// `msg.timeSpan`
    Message,
    /// `msg.req.query.timeSpan`
    RequestQuery,
    /// Node setting.
    Default,
}

/// A built query request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub descriptor: RequestDescriptor,
    /// Resolved table name.
    pub table: String,
    /// Resolved window length in seconds.
    pub time_span: u64,
    pub source: TimeSpanSource,
    /// The SQL text sent as `q`.
    pub sql: String,
}

impl QueryRequest {
    /// Attach the descriptor to `msg` and stamp the resolved `bucket`
    /// (table) and `timeSpan` for downstream nodes.
    pub fn attach_to(&self, msg: &mut Message) {
        self.descriptor.attach_to(msg);
        msg.set(keys::BUCKET, self.table.clone());
        msg.set(keys::TIME_SPAN, self.time_span);
    }
}

/// Render the windowed query.
pub fn build_sql(table: &str, time_span_secs: u64) -> String {
    format!(
        "SELECT * FROM \"{}\" WHERE time >= now() - INTERVAL '{} SECOND' ORDER BY time",
        table, time_span_secs
    )
}

/// Pick the table: message value first, then the node setting.
pub fn resolve_table<'a>(msg: &'a Message, settings: &'a QuerySettings) -> Result<&'a str, RequestError> {
    let table = msg.text(keys::TABLE).unwrap_or(settings.table.as_str());
    if table.is_empty() || table == UNSET_TABLE {
        return Err(RequestError::input(
            keys::TABLE,
            table,
            "No valid table specified",
        ));
    }
    Ok(table)
}

/// Interpret a supplied time span value.
///
/// `None` means "not supplied" (null or blank string), so the next source
/// is consulted. Numbers with a zero fraction count as integers.
fn integer_value(value: &Value) -> Option<Result<i64, ()>> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().parse::<i64>().map_err(|_| ())),
        Value::Number(n) => Some(match n.as_i64() {
            Some(i) => Ok(i),
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                _ => Err(()),
            },
        }),
        _ => Some(Err(())),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => json_type(other).to_string(),
    }
}

fn positive(field: &'static str, shown: String, parsed: Result<i64, ()>) -> Result<u64, RequestError> {
    match parsed {
        Ok(secs) if secs > 0 => Ok(secs as u64),
        _ => Err(RequestError::input(
            field,
            shown,
            "Invalid timeSpan: Must be a positive integer",
        )),
    }
}

/// Resolve the window length: message, then request query, then default.
///
/// The first supplied source wins; a supplied value that is not a positive
/// integer is an error rather than a reason to fall through.
pub fn resolve_time_span(
    msg: &Message,
    default_secs: i64,
) -> Result<(u64, TimeSpanSource), RequestError> {
    let candidates = [
        (msg.get(keys::TIME_SPAN), keys::TIME_SPAN, TimeSpanSource::Message),
        (
            msg.request_query(keys::TIME_SPAN),
            "req.query.timeSpan",
            TimeSpanSource::RequestQuery,
        ),
    ];

    for (value, field, source) in candidates {
        if let Some(value) = value {
            if let Some(parsed) = integer_value(value) {
                return positive(field, render(value), parsed).map(|secs| (secs, source));
            }
        }
    }

    positive("defaultTimeSpan", default_secs.to_string(), Ok(default_secs))
        .map(|secs| (secs, TimeSpanSource::Default))
}

/// Builds GET descriptors for the SQL query endpoint.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    settings: QuerySettings,
}

impl QueryBuilder {
    pub fn new(settings: QuerySettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &QuerySettings {
        &self.settings
    }

    /// Build the query request for `msg` against `profile`.
    pub fn build(
        &self,
        msg: &Message,
        profile: Option<&ConnectionProfile>,
    ) -> Result<QueryRequest, RequestError> {
        let profile = require_profile(profile)?;
        let authorization = profile.authorization()?;

        let table = resolve_table(msg, &self.settings)?;
        let (time_span, source) = resolve_time_span(msg, self.settings.default_time_span)?;

        let sql = build_sql(table, time_span);
        let url = endpoint_url(
            profile,
            profile.version.query_path(),
            &[
                ("db", profile.database.as_str()),
                ("q", sql.as_str()),
                ("format", "json"),
            ],
        );

        let timeout_ms = msg
            .timeout_override()
            .or(self.settings.timeout_ms)
            .unwrap_or(DEFAULT_QUERY_TIMEOUT_MS);

        let descriptor = RequestDescriptor::get(url)
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
            .timeout_ms(timeout_ms);

        debug!(
            table,
            time_span,
            ?source,
            version = %profile.version,
            "built query request"
        );

        Ok(QueryRequest {
            descriptor,
            table: table.to_string(),
            time_span,
            source,
            sql,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Method;
    use crate::dialect::ApiVersion;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn profile(version: ApiVersion) -> ConnectionProfile {
        ConnectionProfile::new("localhost", "telemetry")
            .port(8086)
            .org("acme")
            .version(version)
            .token("secret")
    }

    #[test]
    fn test_build_sql() {
        assert_eq!(
            build_sql("metrics", 60),
            "SELECT * FROM \"metrics\" WHERE time >= now() - INTERVAL '60 SECOND' ORDER BY time"
        );
    }

    #[test]
    fn test_v3_query_descriptor() {
        let builder = QueryBuilder::default();
        let msg = Message::new().with("table", "metrics").with("timeSpan", 60);
        let req = builder
            .build(&msg, Some(&profile(ApiVersion::V3)))
            .expect("build");

        let d = &req.descriptor;
        assert_eq!(d.method, Method::Get);
        assert!(d.url.starts_with("http://localhost:8086/api/v3/query_sql?db=telemetry&q="));
        assert!(d.url.ends_with("&format=json"));
        assert_eq!(d.header_value(AUTHORIZATION), Some("Bearer secret"));
        assert_eq!(d.header_value(CONTENT_TYPE), Some("application/json"));
        assert_eq!(d.header_value(ACCEPT), Some("application/json"));
        assert_eq!(d.body, None);
        assert_eq!(d.timeout_ms, 30_000);
        assert_eq!(req.table, "metrics");
        assert_eq!(req.time_span, 60);
    }

    #[test]
    fn test_v2_query_descriptor() {
        let builder = QueryBuilder::new(QuerySettings::for_table("cpu"));
        let req = builder
            .build(&Message::new(), Some(&profile(ApiVersion::V2)))
            .expect("build");
        assert!(req.descriptor.url.contains("/api/v2/query?"));
        assert_eq!(
            req.descriptor.header_value(AUTHORIZATION),
            Some("Token secret")
        );
        assert_eq!(req.time_span, 604_800);
        assert_eq!(req.source, TimeSpanSource::Default);
    }

    #[test]
    fn test_query_is_percent_encoded() {
        let msg = Message::new().with("table", "metrics").with("timeSpan", 60);
        let req = QueryBuilder::default()
            .build(&msg, Some(&profile(ApiVersion::V3)))
            .expect("build");
        let q = req
            .descriptor
            .url
            .split("&q=")
            .nth(1)
            .and_then(|rest| rest.split('&').next())
            .expect("q param");
        assert!(!q.contains(' '));
        assert!(!q.contains('"'));
        assert_eq!(urlencoding::decode(q).expect("utf-8").into_owned(), req.sql);
    }

    #[test]
    fn test_message_table_overrides_setting() {
        let settings = QuerySettings::for_table("node_table");
        let msg = Message::new().with("table", "msg_table");
        assert_eq!(resolve_table(&msg, &settings).expect("table"), "msg_table");
        assert_eq!(
            resolve_table(&Message::new(), &settings).expect("table"),
            "node_table"
        );
    }

    #[test]
    fn test_unset_table_is_input_error() {
        let settings = QuerySettings::default();
        let err = resolve_table(&Message::new(), &settings).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
        assert_eq!(err.field(), Some("table"));

        let msg = Message::new().with("table", UNSET_TABLE);
        assert!(resolve_table(&msg, &QuerySettings::for_table("x")).is_err());
    }

    #[test]
    fn test_time_span_priority() {
        let both = Message::from_value(json!({
            "timeSpan": 10,
            "req": {"query": {"timeSpan": "20"}}
        }))
        .expect("object");
        assert_eq!(
            resolve_time_span(&both, 30).expect("span"),
            (10, TimeSpanSource::Message)
        );

        let request_only =
            Message::from_value(json!({"req": {"query": {"timeSpan": "20"}}})).expect("object");
        assert_eq!(
            resolve_time_span(&request_only, 30).expect("span"),
            (20, TimeSpanSource::RequestQuery)
        );

        assert_eq!(
            resolve_time_span(&Message::new(), 30).expect("span"),
            (30, TimeSpanSource::Default)
        );
    }

    #[test]
    fn test_blank_sources_fall_through() {
        let msg = Message::from_value(json!({
            "timeSpan": null,
            "req": {"query": {"timeSpan": ""}}
        }))
        .expect("object");
        assert_eq!(
            resolve_time_span(&msg, 45).expect("span"),
            (45, TimeSpanSource::Default)
        );
    }

    #[test]
    fn test_invalid_time_spans() {
        for bad in [json!(0), json!(-5), json!(1.5), json!("abc"), json!("6O"), json!(true)] {
            let msg = Message::new().with("timeSpan", bad.clone());
            let err = resolve_time_span(&msg, 30).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Input, "{bad}");
            assert_eq!(err.field(), Some("timeSpan"));
        }

        let err = resolve_time_span(&Message::new(), 0).unwrap_err();
        assert_eq!(err.field(), Some("defaultTimeSpan"));
    }

    #[test]
    fn test_integral_float_and_string_spans() {
        let msg = Message::new().with("timeSpan", 120.0);
        assert_eq!(resolve_time_span(&msg, 1).expect("span").0, 120);
        let msg = Message::new().with("timeSpan", " 90 ");
        assert_eq!(resolve_time_span(&msg, 1).expect("span").0, 90);
    }

    #[test]
    fn test_missing_profile_or_token() {
        let builder = QueryBuilder::new(QuerySettings::for_table("cpu"));
        let err = builder.build(&Message::new(), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let no_token = profile(ApiVersion::V2).token("");
        let err = builder.build(&Message::new(), Some(&no_token)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_config_checked_before_input() {
        // Unset table and no token: the token error wins.
        let err = QueryBuilder::default()
            .build(&Message::new(), Some(&profile(ApiVersion::V3).token("")))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_timeout_resolution() {
        let settings = QuerySettings {
            timeout_ms: Some(12_000),
            ..QuerySettings::for_table("cpu")
        };
        let builder = QueryBuilder::new(settings);
        let p = profile(ApiVersion::V2);

        let req = builder.build(&Message::new(), Some(&p)).expect("build");
        assert_eq!(req.descriptor.timeout_ms, 12_000);

        let msg = Message::new().with("timeout", 500);
        let req = builder.build(&msg, Some(&p)).expect("build");
        assert_eq!(req.descriptor.timeout_ms, 500);
    }

    #[test]
    fn test_attach_stamps_bucket_and_time_span() {
        let mut msg = Message::new().with("table", "metrics").with("timeSpan", "60");
        let req = QueryBuilder::default()
            .build(&msg, Some(&profile(ApiVersion::V3)))
            .expect("build");
        req.attach_to(&mut msg);

        assert_eq!(msg.get("bucket"), Some(&json!("metrics")));
        assert_eq!(msg.get("timeSpan"), Some(&json!(60)));
        assert_eq!(msg.get("method"), Some(&json!("GET")));
        assert_eq!(msg.get("payload"), Some(&Value::Null));
    }
}
