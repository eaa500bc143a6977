// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML configuration: connection profiles and node definitions.
//!
//! ```yaml
//! profiles:
//!   local:
//!     host: localhost
//!     port: 8086
//!     database: telemetry
//!     org: acme
//!     version: "2.x"
//!     token_env: INFLUX_TOKEN
//! queries:
//!   - name: cpu-recent
//!     profile: local
//!     table: cpu
//!     default_time_span: 3600
//! writers:
//!   - name: ingest
//!     profile: local
//!     tags: "region=us,env=prod"
//! ```

use crate::dialect::ApiVersion;
use crate::pipeline::{QueryNode, WriteNode};
use crate::profile::ConnectionProfile;
use crate::query::QuerySettings;
use crate::tags::ExtraTags;
use crate::writer::WriteSettings;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Node '{node}' references unknown profile '{profile}'")]
    UnknownProfile { node: String, profile: String },

    #[error("No {kind} node named '{name}'")]
    UnknownNode { kind: &'static str, name: String },
}

/// A named connection profile as written in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(flatten)]
    pub connection: ConnectionProfile,

    /// Environment variable holding the token, read at load time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}

/// Query node definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryNodeConfig {
    pub name: String,
    pub profile: String,
    #[serde(flatten)]
    pub settings: QuerySettings,
}

/// Write node definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteNodeConfig {
    pub name: String,
    pub profile: String,
    #[serde(flatten)]
    pub settings: WriteSettings,
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub profiles: BTreeMap<String, ProfileConfig>,

    #[serde(default)]
    pub queries: Vec<QueryNodeConfig>,

    #[serde(default)]
    pub writers: Vec<WriteNodeConfig>,
}

/// Resolved profiles, shared read-only between nodes.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, Arc<ConnectionProfile>>,
}

impl ProfileRegistry {
    /// Shared handle to the profile called `name`.
    pub fn get(&self, name: &str) -> Option<Arc<ConnectionProfile>> {
        self.profiles.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl BridgeConfig {
    /// Parse, resolve `token_env` and validate.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yaml::from_str(yaml)?;
        config.resolve_tokens();
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Serialize back to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    // An unset variable leaves the configured token (usually empty) in
    // place; the pipelines reject empty tokens per invocation.
    fn resolve_tokens(&mut self) {
        for (name, profile) in &mut self.profiles {
            let Some(var) = profile.token_env.as_deref() else {
                continue;
            };
            match std::env::var(var) {
                Ok(token) if !token.is_empty() => profile.connection.token = token,
                _ => debug!(profile = %name, var, "token variable not set"),
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.profiles.is_empty() {
            return Err(ConfigError::Invalid("No profiles configured".into()));
        }

        for (name, profile) in &self.profiles {
            if profile.connection.host.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "Profile '{}' has an empty host",
                    name
                )));
            }
        }

        let mut seen = HashSet::new();
        for query in &self.queries {
            self.check_node("query", &query.name, &query.profile, &mut seen)?;
            if query.settings.default_time_span <= 0 {
                return Err(ConfigError::Invalid(format!(
                    "Query '{}' has a non-positive default_time_span ({})",
                    query.name, query.settings.default_time_span
                )));
            }
        }

        let mut seen = HashSet::new();
        for writer in &self.writers {
            self.check_node("write", &writer.name, &writer.profile, &mut seen)?;
            if let Err(e) = ExtraTags::parse(&writer.settings.tags) {
                return Err(ConfigError::Invalid(format!(
                    "Writer '{}' has malformed tags: {}",
                    writer.name, e
                )));
            }
        }

        Ok(())
    }

    fn check_node<'a>(
        &self,
        kind: &str,
        name: &'a str,
        profile: &str,
        seen: &mut HashSet<&'a str>,
    ) -> Result<(), ConfigError> {
        if name.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("A {} node has an empty name", kind)));
        }
        if !seen.insert(name) {
            return Err(ConfigError::Invalid(format!(
                "Duplicate {} node name '{}'",
                kind, name
            )));
        }
        if !self.profiles.contains_key(profile) {
            return Err(ConfigError::UnknownProfile {
                node: name.to_string(),
                profile: profile.to_string(),
            });
        }
        Ok(())
    }

    /// Shared handles to every profile.
    pub fn registry(&self) -> ProfileRegistry {
        ProfileRegistry {
            profiles: self
                .profiles
                .iter()
                .map(|(name, p)| (name.clone(), Arc::new(p.connection.clone())))
                .collect(),
        }
    }

    /// Instantiate the query node called `name`.
    pub fn query_node(
        &self,
        name: &str,
        registry: &ProfileRegistry,
    ) -> Result<QueryNode, ConfigError> {
        let node = self
            .queries
            .iter()
            .find(|q| q.name == name)
            .ok_or_else(|| ConfigError::UnknownNode {
                kind: "query",
                name: name.to_string(),
            })?;
        Ok(QueryNode::new(
            &node.name,
            node.settings.clone(),
            registry.get(&node.profile),
        ))
    }

    /// Instantiate the write node called `name`.
    pub fn write_node(
        &self,
        name: &str,
        registry: &ProfileRegistry,
    ) -> Result<WriteNode, ConfigError> {
        let node = self
            .writers
            .iter()
            .find(|w| w.name == name)
            .ok_or_else(|| ConfigError::UnknownNode {
                kind: "write",
                name: name.to_string(),
            })?;
        Ok(WriteNode::new(
            &node.name,
            node.settings.clone(),
            registry.get(&node.profile),
        ))
    }

    /// Example configuration written by `gen-config`.
    pub fn example() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "local".to_string(),
            ProfileConfig {
                connection: ConnectionProfile::new("localhost", "telemetry")
                    .port(8086)
                    .org("acme"),
                token_env: Some("INFLUX_TOKEN".into()),
            },
        );
        profiles.insert(
            "edge-v3".to_string(),
            ProfileConfig {
                connection: ConnectionProfile::new("edge.example.com", "sensors")
                    .port(8181)
                    .version(ApiVersion::V3)
                    .tls(true),
                token_env: Some("INFLUX_V3_TOKEN".into()),
            },
        );

        Self {
            profiles,
            queries: vec![QueryNodeConfig {
                name: "cpu-recent".into(),
                profile: "local".into(),
                settings: QuerySettings {
                    table: "cpu".into(),
                    default_time_span: 3600,
                    timeout_ms: None,
                },
            }],
            writers: vec![
                WriteNodeConfig {
                    name: "ingest".into(),
                    profile: "local".into(),
                    settings: WriteSettings::with_tags("region=us,env=prod"),
                },
                WriteNodeConfig {
                    name: "edge-ingest".into(),
                    profile: "edge-v3".into(),
                    settings: WriteSettings {
                        tags: String::new(),
                        timeout_ms: Some(10_000),
                    },
                },
            ],
        }
    }
}
