// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! InfluxDB request builder and Line Protocol filter
//!
//! Turns host messages into ready-to-send HTTP request descriptors for
//! InfluxDB 2.x and 3.x. No I/O is performed; an external HTTP client
//! executes the descriptor.
//!
//! # Features
//!
//! - **Query**: time-windowed SQL `GET` against `/api/v2/query` or
//!   `/api/v3/query_sql`
//! - **Write**: validates `<series> value=<number> <timestamp>` records,
//!   injects positional tags, and builds a `POST` against `/api/v2/write`
//!   or `/api/v3/write_lp`
//! - **Diagnostics**: invalid records are dropped with a warning, fatal
//!   errors are classified as config, input or unexpected
//!
//! # Quick Start
//!
//! ```
//! use influx_bridge::{ConnectionProfile, LineProtocolWriter, Message, WriteSettings};
//! use serde_json::json;
//!
//! let profile = ConnectionProfile::new("localhost", "telemetry")
//!     .org("acme")
//!     .token("my-token");
//! let writer = LineProtocolWriter::new(WriteSettings::with_tags("region=us"));
//! let msg = Message::new().with("payload", json!(["cpu value=42.5 1690000000"]));
//!
//! let request = writer.build(&msg, Some(&profile)).unwrap();
//! assert_eq!(
//!     request.descriptor.body.as_deref(),
//!     Some("cpu,tag_0=region\\=us value=42.5 1690000000")
//! );
//! ```
//!
//! # Command Line
//!
//! ```bash
//! influx-bridge gen-config --output bridge.yaml
//! echo '{"timeSpan": 60}' | influx-bridge query --config bridge.yaml --node cpu-recent
//! influx-bridge check-lines --input records.lp
//! ```

pub mod config;
pub mod descriptor;
pub mod dialect;
pub mod error;
pub mod line_protocol;
pub mod message;
pub mod pipeline;
pub mod profile;
pub mod query;
pub mod tags;
pub mod writer;

pub use config::{BridgeConfig, ConfigError, ProfileRegistry};
pub use descriptor::{Method, RequestDescriptor};
pub use dialect::ApiVersion;
pub use error::{ErrorKind, RecordIssue, RecordWarning, RequestError};
pub use line_protocol::{validate, LineError, ValidatedLine};
pub use message::Message;
pub use pipeline::{Pipeline, QueryNode, WriteNode};
pub use profile::ConnectionProfile;
pub use query::{QueryBuilder, QueryRequest, QuerySettings, TimeSpanSource};
pub use tags::{ExtraTags, TagError};
pub use writer::{LineProtocolWriter, WriteRequest, WriteSettings};
