// src/api/mod.rs
//! Registry API interaction: the ability to fetch one page of the catalog.
//!
//! This module keeps HTTP details (`client`), wire shapes (`responses`) and
//! decoding (`parser`) apart. Everything above it depends only on the
//! [`CatalogSource`] trait.

pub mod client;
pub mod parser;
pub mod responses;

use crate::error::RemoteFetchError;
use crate::model::Entry;
use crate::types::PageSize;
use chrono::{DateTime, Utc};

/// Parameters of a single listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    /// Free-text search; empty means no `search` parameter.
    pub search: String,
    /// Continuation cursor from the previous page; `None` starts at the beginning.
    pub cursor: Option<String>,
    pub updated_since: Option<DateTime<Utc>>,
    pub page_size: PageSize,
}

impl PageQuery {
    /// First page of an unfiltered listing.
    pub fn first(page_size: PageSize) -> Self {
        Self {
            search: String::new(),
            cursor: None,
            updated_since: None,
            page_size,
        }
    }

    pub fn with_cursor(self, cursor: Option<String>) -> Self {
        Self { cursor, ..self }
    }
}

/// One page of the catalog as returned by the registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogPage {
    pub entries: Vec<Entry>,
    /// Opaque continuation token; `None` at the end of the results.
    pub next_cursor: Option<String>,
}

/// The ability to fetch one page of a remote catalog.
///
/// Implementations perform exactly one request per call: no retry, no
/// caching. Any non-success outcome is a [`RemoteFetchError`].
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_page(&self, query: &PageQuery) -> Result<CatalogPage, RemoteFetchError>;

    /// Human-readable identity of the source, used in log lines.
    fn describe(&self) -> String;
}

pub use client::RegistryHttpClient;
