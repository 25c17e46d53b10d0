//! In-process replica store.

use super::{index_by_name, ReplicaInfo, ReplicaStore};
use crate::model::Entry;
use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

struct Snapshot {
    entries: Arc<IndexMap<String, Entry>>,
    info: Option<ReplicaInfo>,
}

/// Keeps the replica and settings in memory for the life of the process.
///
/// Replacement swaps a whole snapshot under the write lock, so a reader
/// holding the previous `Arc` keeps a consistent view.
pub struct MemoryReplicaStore {
    snapshot: RwLock<Snapshot>,
    settings: RwLock<HashMap<String, Value>>,
}

impl MemoryReplicaStore {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Snapshot {
                entries: Arc::new(IndexMap::new()),
                info: None,
            }),
            settings: RwLock::new(HashMap::new()),
        }
    }

    /// A store pre-populated with `entries`, as if a build had just finished.
    pub fn with_entries(entries: Vec<Entry>) -> Self {
        let store = Self::new();
        store.install(entries);
        store
    }

    fn install(&self, entries: Vec<Entry>) {
        let indexed = index_by_name(entries);
        let info = ReplicaInfo {
            entry_count: indexed.len(),
            built_at: Utc::now(),
        };
        let mut snapshot = self.snapshot.write();
        snapshot.entries = Arc::new(indexed);
        snapshot.info = Some(info);
    }
}

impl Default for MemoryReplicaStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ReplicaStore for MemoryReplicaStore {
    async fn replace_all_entries(&self, entries: Vec<Entry>) {
        self.install(entries);
    }

    async fn get_all_entries(&self) -> Vec<Entry> {
        let entries = Arc::clone(&self.snapshot.read().entries);
        entries.values().cloned().collect()
    }

    async fn has_entries(&self) -> bool {
        !self.snapshot.read().entries.is_empty()
    }

    async fn replica_info(&self) -> Option<ReplicaInfo> {
        self.snapshot.read().info.clone()
    }

    async fn get_setting(&self, key: &str) -> Option<Value> {
        self.settings.read().get(key).cloned()
    }

    async fn set_setting(&self, key: &str, value: Value) {
        self.settings.write().insert(key.to_string(), value);
    }
}
