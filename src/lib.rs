//! mcp-catalog library: browse an MCP server registry remotely or from a
//! local replica, and export selected servers as IDE configuration.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `RemoteFetchError`, `ReplicaCrawlAborted`, `ValidationError`
//! - **Configuration**: `CommandLineInput`, `CatalogConfig`, `Preferences`
//! - **Domain model**: `Entry`, `Package`, `Remote`, `AccessPoint`
//! - **Registry access**: `CatalogSource`, `RegistryHttpClient`
//! - **Replica**: `ReplicaStore`, `DiskReplicaStore`, `ReplicaBuilder`, `QueryEngine`
//! - **Navigation**: `PageNavigator`, `PageToken`
//! - **Session**: `CatalogSession`, the context tying the above together
//! - **Export**: `Stack`, `ExportFormat`, output delivery

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod index;
pub mod model;
pub mod output;
pub mod pagination;
pub mod session;
pub mod settings;
pub mod stack;
pub mod store;
pub mod types;

#[cfg(test)]
mod testing;

// --- Error Handling ---
pub use crate::error::{AppError, RemoteFetchError, ReplicaCrawlAborted};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CatalogConfig, CommandLineInput};
pub use crate::settings::Preferences;

// --- Domain Model ---
pub use crate::model::{AccessKind, AccessPoint, Entry, KeyValueInput, Package, Remote};

// --- Domain Types ---
pub use crate::types::{PageSize, RegistryUrl};

// --- Registry access ---
pub use crate::api::{CatalogPage, CatalogSource, PageQuery, RegistryHttpClient};

// --- Replica ---
pub use crate::index::{
    BuildOutcome, FilterSet, QueryEngine, QueryMode, QueryPage, QueryParams, ReplicaBuilder,
};
pub use crate::store::{DiskReplicaStore, MemoryReplicaStore, ReplicaInfo, ReplicaStore};

// --- Navigation ---
pub use crate::pagination::{NavigationOutcome, PageNavigator, PageToken, UnreachablePage};

// --- Session and export ---
pub use crate::export::ExportFormat;
pub use crate::session::CatalogSession;
pub use crate::stack::{ItemConfig, Stack, StackItem};
