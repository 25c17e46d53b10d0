//! Shared helpers for the integration tests.

#![allow(dead_code)]

use mcp_catalog::api::{CatalogPage, CatalogSource, PageQuery};
use mcp_catalog::{Entry, RemoteFetchError};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory registry serving fixed pages keyed by cursor.
pub struct MockRegistry {
    pages: HashMap<Option<String>, CatalogPage>,
    fail_on_call: Option<usize>,
    requests: Mutex<Vec<PageQuery>>,
}

impl MockRegistry {
    /// Splits `names` into registry pages of `per_page`, chained with
    /// cursors `c1`, `c2`, ...
    pub fn paged(names: &[&str], per_page: usize) -> Self {
        let chunks: Vec<&[&str]> = names.chunks(per_page.max(1)).collect();
        let mut pages = HashMap::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let cursor = (i > 0).then(|| format!("c{}", i));
            let next = (i + 1 < chunks.len()).then(|| format!("c{}", i + 1));
            pages.insert(
                cursor,
                CatalogPage {
                    entries: chunk.iter().map(|n| entry(n)).collect(),
                    next_cursor: next,
                },
            );
        }
        if pages.is_empty() {
            pages.insert(None, CatalogPage::default());
        }
        Self {
            pages,
            fail_on_call: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Makes the `n`th request (1-based) fail with a 503.
    pub fn failing_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn cursors(&self) -> Vec<Option<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|q| q.cursor.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl CatalogSource for MockRegistry {
    async fn fetch_page(&self, query: &PageQuery) -> Result<CatalogPage, RemoteFetchError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(query.clone());
            requests.len()
        };
        if self.fail_on_call == Some(call) {
            return Err(RemoteFetchError::HttpStatus {
                url: "mock://registry".to_string(),
                status: StatusCode::SERVICE_UNAVAILABLE,
                detail: Some("registry unavailable".to_string()),
            });
        }
        self.pages
            .get(&query.cursor)
            .cloned()
            .ok_or_else(|| RemoteFetchError::HttpStatus {
                url: "mock://registry".to_string(),
                status: StatusCode::BAD_REQUEST,
                detail: Some("invalid cursor".to_string()),
            })
    }

    fn describe(&self) -> String {
        "mock://registry".to_string()
    }
}

pub fn entry(name: &str) -> Entry {
    Entry::new(name, format!("The {} server", name))
}

pub fn names(entries: &[Entry]) -> Vec<&str> {
    entries.iter().map(|e| e.name()).collect()
}
