//! Persistent local storage: the catalog replica and user settings.
//!
//! Storage is best-effort. An implementation that cannot read or write
//! logs a warning and behaves as empty (reads) or as a no-op (writes);
//! nothing here returns an error, so the browser keeps working without
//! persistence.

mod disk;
mod memory;

pub use disk::DiskReplicaStore;
pub use memory::MemoryReplicaStore;

use crate::model::Entry;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Facts about the stored replica, written alongside it on every replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicaInfo {
    pub entry_count: usize,
    pub built_at: DateTime<Utc>,
}

/// Local store for the replica and for settings.
///
/// The entry collection has a single writer (the replica builder) and a
/// single reader (the query engine). Readers observe either the previous
/// complete collection or the new complete collection, never a mix.
#[async_trait::async_trait]
pub trait ReplicaStore: Send + Sync {
    /// Clears the collection and repopulates it in one step.
    async fn replace_all_entries(&self, entries: Vec<Entry>);

    /// The full collection in stored order; empty if never populated.
    async fn get_all_entries(&self) -> Vec<Entry>;

    /// Whether a replica exists, without materializing it.
    async fn has_entries(&self) -> bool;

    /// Count and build time of the current replica, if one exists.
    async fn replica_info(&self) -> Option<ReplicaInfo>;

    async fn get_setting(&self, key: &str) -> Option<Value>;

    async fn set_setting(&self, key: &str, value: Value);
}

/// Keys entries by name, keeping first-seen position and last-seen value.
pub(crate) fn index_by_name(entries: Vec<Entry>) -> IndexMap<String, Entry> {
    let mut indexed = IndexMap::with_capacity(entries.len());
    for entry in entries {
        indexed.insert(entry.name().to_string(), entry);
    }
    indexed
}
