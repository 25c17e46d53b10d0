//! Test doubles shared by the unit tests.

use crate::api::{CatalogPage, CatalogSource, PageQuery};
use crate::error::RemoteFetchError;
use crate::model::Entry;
use parking_lot::Mutex;
use reqwest::StatusCode;
use std::collections::HashMap;

/// A catalog source that serves canned pages keyed by the request cursor.
///
/// Every request is recorded so tests can assert which cursors were sent.
pub(crate) struct ScriptedSource {
    pages: HashMap<Option<String>, CatalogPage>,
    requests: Mutex<Vec<PageQuery>>,
    fail_on_call: Option<usize>,
}

impl ScriptedSource {
    /// `(cursor, entry names, next cursor)` triples.
    pub(crate) fn pages(script: Vec<(Option<&str>, Vec<&str>, Option<&str>)>) -> Self {
        let pages = script
            .into_iter()
            .map(|(cursor, names, next)| {
                let page = CatalogPage {
                    entries: names
                        .into_iter()
                        .map(|n| Entry::new(n, format!("{} server", n)))
                        .collect(),
                    next_cursor: next.map(str::to_string),
                };
                (cursor.map(str::to_string), page)
            })
            .collect();
        Self {
            pages,
            requests: Mutex::new(Vec::new()),
            fail_on_call: None,
        }
    }

    /// Makes the `n`th request (1-based) fail with a 503.
    pub(crate) fn failing_on_call(self, n: usize) -> Self {
        Self {
            fail_on_call: Some(n),
            ..self
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub(crate) fn requested_cursors(&self) -> Vec<Option<String>> {
        self.requests.lock().iter().map(|q| q.cursor.clone()).collect()
    }

    pub(crate) fn last_request(&self) -> Option<PageQuery> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait::async_trait]
impl CatalogSource for ScriptedSource {
    async fn fetch_page(&self, query: &PageQuery) -> Result<CatalogPage, RemoteFetchError> {
        let call = {
            let mut requests = self.requests.lock();
            requests.push(query.clone());
            requests.len()
        };
        if self.fail_on_call == Some(call) {
            return Err(RemoteFetchError::HttpStatus {
                url: "scripted://registry".to_string(),
                status: StatusCode::SERVICE_UNAVAILABLE,
                detail: None,
            });
        }
        self.pages
            .get(&query.cursor)
            .cloned()
            .ok_or_else(|| RemoteFetchError::HttpStatus {
                url: "scripted://registry".to_string(),
                status: StatusCode::BAD_REQUEST,
                detail: Some(format!("unknown cursor {:?}", query.cursor)),
            })
    }

    fn describe(&self) -> String {
        "scripted://registry".to_string()
    }
}
