// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Host-facing pipeline nodes.
//!
//! A node owns its settings and a shared, read-only connection profile.
//! Each call to [`Pipeline::handle`] is independent: the message goes in,
//! and either the same message comes back with a request descriptor
//! attached or the error is logged and returned. Nothing partial is ever
//! attached.

use crate::error::RequestError;
use crate::message::Message;
use crate::profile::ConnectionProfile;
use crate::query::{QueryBuilder, QueryRequest, QuerySettings};
use crate::writer::{LineProtocolWriter, WriteRequest, WriteSettings};
use std::sync::Arc;
use tracing::error;

/// A message-processing node.
pub trait Pipeline: Send + Sync {
    /// Node name, used in log events.
    fn name(&self) -> &str;

    /// Process one message.
    fn handle(&self, msg: Message) -> Result<Message, RequestError>;
}

fn report<T>(node: &str, result: Result<T, RequestError>) -> Result<T, RequestError> {
    if let Err(e) = &result {
        error!(node, kind = ?e.kind(), "{}", e);
    }
    result
}

/// Query node: builds a GET descriptor for the SQL endpoint.
#[derive(Debug, Clone)]
pub struct QueryNode {
    name: String,
    builder: QueryBuilder,
    profile: Option<Arc<ConnectionProfile>>,
}

impl QueryNode {
    pub fn new(
        name: impl Into<String>,
        settings: QuerySettings,
        profile: Option<Arc<ConnectionProfile>>,
    ) -> Self {
        Self {
            name: name.into(),
            builder: QueryBuilder::new(settings),
            profile,
        }
    }

    pub fn settings(&self) -> &QuerySettings {
        self.builder.settings()
    }

    /// Build the request without touching the message.
    pub fn request(&self, msg: &Message) -> Result<QueryRequest, RequestError> {
        report(&self.name, self.builder.build(msg, self.profile.as_deref()))
    }
}

impl Pipeline for QueryNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, mut msg: Message) -> Result<Message, RequestError> {
        let request = self.request(&msg)?;
        request.attach_to(&mut msg);
        Ok(msg)
    }
}

/// Write node: validates records and builds a POST descriptor.
#[derive(Debug, Clone)]
pub struct WriteNode {
    name: String,
    writer: LineProtocolWriter,
    profile: Option<Arc<ConnectionProfile>>,
}

impl WriteNode {
    pub fn new(
        name: impl Into<String>,
        settings: WriteSettings,
        profile: Option<Arc<ConnectionProfile>>,
    ) -> Self {
        Self {
            name: name.into(),
            writer: LineProtocolWriter::new(settings),
            profile,
        }
    }

    pub fn settings(&self) -> &WriteSettings {
        self.writer.settings()
    }

    /// Build the request without touching the message.
    pub fn request(&self, msg: &Message) -> Result<WriteRequest, RequestError> {
        report(&self.name, self.writer.build(msg, self.profile.as_deref()))
    }
}

impl Pipeline for WriteNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, mut msg: Message) -> Result<Message, RequestError> {
        let request = self.request(&msg)?;
        request.attach_to(&mut msg);
        Ok(msg)
    }
}
