//! Catalog entries as served by the registry.
//!
//! The shapes mirror the registry's `ServerResponse` schema. Entries are
//! immutable snapshots: nothing in the crate edits a fetched entry, the
//! replica only ever replaces the whole collection. Unknown fields are kept
//! in `extra` so a stored replica round-trips documents losslessly.

mod access;

pub use access::{AccessKind, AccessPoint, KeyValueInput, Package, PackageArgument, Remote};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata namespace the official registry publishes under `_meta`.
pub const OFFICIAL_META_KEY: &str = "io.modelcontextprotocol.registry/official";

/// One catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub server: ServerDetails,
    #[serde(rename = "_meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<EntryMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerDetails {
    /// Stable identity key, unique within the catalog.
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<Repository>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<Package>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remotes: Vec<Remote>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub url: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subfolder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryMeta {
    #[serde(
        rename = "io.modelcontextprotocol.registry/official",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub official: Option<PublicationMeta>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Publication status as reported by the official registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_latest: Option<bool>,
}

impl Entry {
    /// Builds a bare entry with no access points.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            server: ServerDetails {
                name: name.into(),
                description: description.into(),
                version: None,
                repository: None,
                website_url: None,
                packages: Vec::new(),
                remotes: Vec::new(),
                extra: Map::new(),
            },
            meta: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.server.name
    }

    pub fn description(&self) -> &str {
        &self.server.description
    }

    pub fn packages(&self) -> &[Package] {
        &self.server.packages
    }

    pub fn remotes(&self) -> &[Remote] {
        &self.server.remotes
    }

    /// Case-insensitive substring match on name or description.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.server.name.to_lowercase().contains(needle)
            || self.server.description.to_lowercase().contains(needle)
    }

    fn publication(&self) -> Option<&PublicationMeta> {
        self.meta.as_ref().and_then(|m| m.official.as_ref())
    }

    /// Last update time published by the registry, if present and parseable.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.publication()
            .and_then(|p| p.updated_at.as_deref())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }

    pub fn status(&self) -> Option<&str> {
        self.publication().and_then(|p| p.status.as_deref())
    }
}
