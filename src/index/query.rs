//! One query surface over two paths: the live registry and the local replica.

use super::filter::FilterSet;
use crate::api::{CatalogSource, PageQuery};
use crate::error::{AppError, RemoteFetchError};
use crate::model::Entry;
use crate::pagination::{Cursor, LocalPageMarker, PageToken};
use crate::store::ReplicaStore;
use crate::types::PageSize;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// Which path answers a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QueryMode {
    /// Ask the registry for each page.
    #[default]
    Remote,
    /// Filter and slice the stored replica in process.
    Local,
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Everything that determines a result sequence, minus the position in it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    pub mode: QueryMode,
    pub search: String,
    pub updated_since: Option<DateTime<Utc>>,
    /// Only honored in local mode; the registry has no filter parameters.
    pub filters: FilterSet,
    pub page_size: PageSize,
}

impl QueryParams {
    pub fn new(mode: QueryMode, page_size: PageSize) -> Self {
        Self {
            mode,
            search: String::new(),
            updated_since: None,
            filters: FilterSet::default(),
            page_size,
        }
    }

    pub fn with_search(self, search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..self
        }
    }

    pub fn with_updated_since(self, updated_since: Option<DateTime<Utc>>) -> Self {
        Self {
            updated_since,
            ..self
        }
    }

    pub fn with_filters(self, filters: FilterSet) -> Self {
        Self { filters, ..self }
    }

    fn local_key(&self) -> LocalQueryKey {
        LocalQueryKey {
            needle: self.search.trim().to_lowercase(),
            updated_since: self.updated_since,
            filters: self.filters.clone(),
        }
    }
}

/// One page of query results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPage {
    pub entries: Vec<Entry>,
    /// Token for the following page; `None` at the end.
    pub next: Option<PageToken>,
    /// Size of the full matching set. Only the local path knows it.
    pub total_matched: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
struct LocalQueryKey {
    needle: String,
    updated_since: Option<DateTime<Utc>>,
    filters: FilterSet,
}

/// The filtered replica for one set of query parameters.
#[derive(Debug, Clone)]
struct IndexedResultSet {
    key: LocalQueryKey,
    entries: Arc<Vec<Entry>>,
}

/// Answers page requests from either path.
///
/// The local path keeps the last filtered result set so paging through the
/// same query does not rescan the replica. Call [`QueryEngine::invalidate`]
/// after the replica is rebuilt.
pub struct QueryEngine {
    source: Arc<dyn CatalogSource>,
    store: Arc<dyn ReplicaStore>,
    indexed: Option<IndexedResultSet>,
}

impl QueryEngine {
    pub fn new(source: Arc<dyn CatalogSource>, store: Arc<dyn ReplicaStore>) -> Self {
        Self {
            source,
            store,
            indexed: None,
        }
    }

    pub fn store(&self) -> &Arc<dyn ReplicaStore> {
        &self.store
    }

    pub fn source(&self) -> &Arc<dyn CatalogSource> {
        &self.source
    }

    pub fn replace_source(&mut self, source: Arc<dyn CatalogSource>) {
        self.source = source;
    }

    /// Drops the memoized local result set.
    pub fn invalidate(&mut self) {
        self.indexed = None;
    }

    /// Fetches the page `token` points to; `None` means the first page.
    ///
    /// A token from the other mode's path is rejected with
    /// [`AppError::TokenMismatch`].
    pub async fn query(
        &mut self,
        params: &QueryParams,
        token: Option<&PageToken>,
    ) -> Result<QueryPage, AppError> {
        match params.mode {
            QueryMode::Remote => {
                let cursor = match token {
                    None => None,
                    Some(PageToken::Cursor(cursor)) => Some(cursor),
                    Some(other) => return Err(token_mismatch(params.mode, other)),
                };
                Ok(self.query_remote(params, cursor).await?)
            }
            QueryMode::Local => {
                let page = match token {
                    None => 1,
                    Some(PageToken::LocalPage(marker)) => marker.page(),
                    Some(other) => return Err(token_mismatch(params.mode, other)),
                };
                Ok(self.query_local(params, page).await)
            }
        }
    }

    async fn query_remote(
        &self,
        params: &QueryParams,
        cursor: Option<&Cursor>,
    ) -> Result<QueryPage, RemoteFetchError> {
        let query = PageQuery {
            search: params.search.trim().to_string(),
            cursor: cursor.map(|c| c.as_str().to_string()),
            updated_since: params.updated_since,
            page_size: params.page_size,
        };
        let page = self.source.fetch_page(&query).await?;
        Ok(QueryPage {
            entries: page.entries,
            next: page.next_cursor.map(|c| PageToken::Cursor(Cursor::new(c))),
            total_matched: None,
        })
    }

    async fn query_local(&mut self, params: &QueryParams, page: usize) -> QueryPage {
        let entries = self.indexed_result_set(params).await;
        let (slice, next) = slice_page(&entries, page, params.page_size);
        QueryPage {
            entries: slice,
            next: next.map(PageToken::LocalPage),
            total_matched: Some(entries.len()),
        }
    }

    async fn indexed_result_set(&mut self, params: &QueryParams) -> Arc<Vec<Entry>> {
        let key = params.local_key();
        if let Some(indexed) = &self.indexed {
            if indexed.key == key {
                return Arc::clone(&indexed.entries);
            }
        }

        let all = self.store.get_all_entries().await;
        let scanned = all.len();
        let matched: Vec<Entry> = all
            .into_iter()
            .filter(|entry| key_admits(&key, entry))
            .collect();
        log::debug!(
            "Local query '{}' matched {} of {} servers",
            key.needle,
            matched.len(),
            scanned
        );

        let entries = Arc::new(matched);
        self.indexed = Some(IndexedResultSet {
            key,
            entries: Arc::clone(&entries),
        });
        entries
    }
}

fn key_admits(key: &LocalQueryKey, entry: &Entry) -> bool {
    entry.matches_lowercase(&key.needle)
        && key.filters.admits(entry)
        && match (key.updated_since, entry.updated_at()) {
            (Some(since), Some(updated)) => updated >= since,
            // Entries without a timestamp are kept.
            _ => true,
        }
}

fn token_mismatch(mode: QueryMode, token: &PageToken) -> AppError {
    AppError::TokenMismatch {
        mode: mode.to_string(),
        token: token.to_string(),
    }
}

/// Page `page` (1-based) of `entries`: `[(page-1)*size, min(page*size, len))`.
///
/// Returns the slice and the marker of the following page, present exactly
/// when `page * size < len`. Pages past the end are empty.
pub fn slice_page(
    entries: &[Entry],
    page: usize,
    page_size: PageSize,
) -> (Vec<Entry>, Option<LocalPageMarker>) {
    let size = page_size.as_usize();
    let page = page.max(1);
    let start = (page - 1).saturating_mul(size).min(entries.len());
    let end = page.saturating_mul(size).min(entries.len());
    let next = if page.saturating_mul(size) < entries.len() {
        LocalPageMarker::for_page(page + 1)
    } else {
        None
    };
    (entries[start..end].to_vec(), next)
}
