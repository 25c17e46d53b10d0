//! Builds the local replica by crawling every page of the catalog.

use crate::api::{CatalogSource, PageQuery};
use crate::error::ReplicaCrawlAborted;
use crate::model::Entry;
use crate::store::{ReplicaInfo, ReplicaStore};
use crate::types::PageSize;
use std::sync::Arc;

/// What a call to [`ReplicaBuilder::build`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    /// A replica already existed and no refresh was forced.
    Skipped { existing: Option<ReplicaInfo> },
    /// A full crawl completed and replaced the stored replica.
    Built { entries: usize, pages: usize },
}

/// Everything a completed crawl collected, in registry order.
#[derive(Debug, Clone)]
pub struct CrawlResult {
    pub entries: Vec<Entry>,
    pub pages_fetched: usize,
}

/// Follows continuation cursors from the first page until the registry
/// stops returning one.
///
/// Nothing is kept if a page fails: the error reports how far the crawl got
/// and the accumulated entries are dropped.
pub async fn crawl_all(
    source: &dyn CatalogSource,
    page_size: PageSize,
) -> Result<CrawlResult, ReplicaCrawlAborted> {
    let mut all_entries = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages_fetched = 0usize;

    loop {
        let query = PageQuery::first(page_size).with_cursor(cursor.take());
        let page = match source.fetch_page(&query).await {
            Ok(page) => page,
            Err(cause) => {
                log::warn!(
                    "Crawl of {} failed on page {}: {}",
                    source.describe(),
                    pages_fetched + 1,
                    cause
                );
                return Err(ReplicaCrawlAborted {
                    pages_fetched,
                    entries_discarded: all_entries.len(),
                    cause,
                });
            }
        };

        pages_fetched += 1;
        log::debug!(
            "Fetched {} servers on crawl page {} (cursor: {})",
            page.entries.len(),
            pages_fetched,
            query.cursor.as_deref().unwrap_or("none")
        );
        all_entries.extend(page.entries);

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    log::info!(
        "Total servers fetched from {}: {} in {} page(s)",
        source.describe(),
        all_entries.len(),
        pages_fetched
    );

    Ok(CrawlResult {
        entries: all_entries,
        pages_fetched,
    })
}

/// Drives a crawl and commits the result to the store in one replace.
pub struct ReplicaBuilder {
    source: Arc<dyn CatalogSource>,
    store: Arc<dyn ReplicaStore>,
    page_size: PageSize,
}

impl ReplicaBuilder {
    pub fn new(source: Arc<dyn CatalogSource>, store: Arc<dyn ReplicaStore>) -> Self {
        Self {
            source,
            store,
            page_size: PageSize::crawl(),
        }
    }

    /// Overrides the crawl page size (the registry maximum by default).
    pub fn with_page_size(self, page_size: PageSize) -> Self {
        Self { page_size, ..self }
    }

    /// Builds the replica.
    ///
    /// Without `force_refresh`, an existing replica is kept as is, however
    /// old. On a crawl failure the stored replica is left untouched.
    pub async fn build(&self, force_refresh: bool) -> Result<BuildOutcome, ReplicaCrawlAborted> {
        if !force_refresh && self.store.has_entries().await {
            let existing = self.store.replica_info().await;
            log::debug!("Replica already populated, skipping crawl");
            return Ok(BuildOutcome::Skipped { existing });
        }

        let crawl = crawl_all(self.source.as_ref(), self.page_size).await?;
        let entries = crawl.entries.len();
        self.store.replace_all_entries(crawl.entries).await;

        Ok(BuildOutcome::Built {
            entries,
            pages: crawl.pages_fetched,
        })
    }
}
