//! Disk-backed replica store.
//!
//! Lives in `$XDG_CACHE_HOME/mcp-catalog` (or `~/.cache/mcp-catalog`). The
//! replica is one JSON array of entries, replaced by writing a sibling temp
//! file and renaming it over the old one, so a reader opens either the old
//! or the new file. A small manifest next to it answers `has_entries`
//! without reading the whole collection.
//!
//! Every operation is best-effort: failures are logged and degrade to
//! empty reads and skipped writes.

use super::{index_by_name, ReplicaInfo, ReplicaStore};
use crate::constants::{ENTRIES_FILE, MANIFEST_FILE, SETTINGS_FILE, STORE_DIR_NAME};
use crate::model::Entry;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

pub struct DiskReplicaStore {
    dir: PathBuf,
    available: bool,
    // Serializes writers within this process; settings are read-modify-write.
    write_lock: Mutex<()>,
}

impl DiskReplicaStore {
    /// Opens (creating if needed) a store in `dir`.
    ///
    /// If the directory cannot be created the store is still returned, but
    /// every operation becomes a no-op.
    pub async fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let available = match tokio::fs::create_dir_all(&dir).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!(
                    "Local storage unavailable at {}: {}. Continuing without persistence.",
                    dir.display(),
                    e
                );
                false
            }
        };
        Self {
            dir,
            available,
            write_lock: Mutex::new(()),
        }
    }

    /// Opens the store in the default per-user location.
    pub async fn open_default() -> Self {
        Self::open(Self::default_dir()).await
    }

    pub fn default_dir() -> PathBuf {
        std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".cache")
            })
            .join(STORE_DIR_NAME)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Reads and decodes a JSON file; `None` when absent or unreadable.
    async fn read_json<T: DeserializeOwned>(&self, file: &str) -> Option<T> {
        if !self.available {
            return None;
        }
        let path = self.path(file);
        let content = match tokio::fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_slice(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring corrupt {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Writes a JSON file through a temp file and rename.
    async fn write_json<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> bool {
        if !self.available {
            return false;
        }
        let path = self.path(file);
        let tmp = self.path(&format!("{}.tmp", file));
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Failed to encode {}: {}", path.display(), e);
                return false;
            }
        };
        if let Err(e) = tokio::fs::write(&tmp, &bytes).await {
            log::warn!("Failed to write {}: {}", tmp.display(), e);
            return false;
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            log::warn!("Failed to move {} into place: {}", path.display(), e);
            let _ = tokio::fs::remove_file(&tmp).await;
            return false;
        }
        true
    }
}

#[async_trait::async_trait]
impl ReplicaStore for DiskReplicaStore {
    async fn replace_all_entries(&self, entries: Vec<Entry>) {
        let _guard = self.write_lock.lock().await;
        let indexed = index_by_name(entries);
        let ordered: Vec<&Entry> = indexed.values().collect();

        if !self.write_json(ENTRIES_FILE, &ordered).await {
            return;
        }
        let info = ReplicaInfo {
            entry_count: ordered.len(),
            built_at: Utc::now(),
        };
        if self.write_json(MANIFEST_FILE, &info).await {
            log::info!(
                "Saved {} servers to {}",
                info.entry_count,
                self.path(ENTRIES_FILE).display()
            );
        }
    }

    async fn get_all_entries(&self) -> Vec<Entry> {
        let entries: Vec<Entry> = self.read_json(ENTRIES_FILE).await.unwrap_or_default();
        log::debug!("Loaded {} servers from {}", entries.len(), self.dir.display());
        entries
    }

    async fn has_entries(&self) -> bool {
        self.replica_info()
            .await
            .is_some_and(|info| info.entry_count > 0)
    }

    async fn replica_info(&self) -> Option<ReplicaInfo> {
        self.read_json(MANIFEST_FILE).await
    }

    async fn get_setting(&self, key: &str) -> Option<Value> {
        let settings: Map<String, Value> = self.read_json(SETTINGS_FILE).await?;
        settings.get(key).cloned()
    }

    async fn set_setting(&self, key: &str, value: Value) {
        let _guard = self.write_lock.lock().await;
        let mut settings: Map<String, Value> =
            self.read_json(SETTINGS_FILE).await.unwrap_or_default();
        settings.insert(key.to_string(), value);
        if !self.write_json(SETTINGS_FILE, &settings).await {
            log::warn!("Setting '{}' was not persisted", key);
        }
    }
}
