// src/api/responses.rs
//! Wire shapes of the registry listing endpoint.

use crate::model::Entry;
use serde::Deserialize;

/// `GET /v0/servers` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerListResponse {
    #[serde(default)]
    pub servers: Vec<Entry>,
    #[serde(default)]
    pub metadata: ListMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMetadata {
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// RFC 7807 problem document the registry sends on errors.
#[derive(Debug, Clone, Deserialize)]
pub struct ProblemDetails {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
}

impl ProblemDetails {
    /// The most specific human-readable message in the document.
    pub fn message(&self) -> Option<String> {
        self.detail
            .clone()
            .filter(|d| !d.is_empty())
            .or_else(|| self.title.clone())
    }
}
