// src/error.rs
//! Application error types with structured error handling.
//!
//! Error types form the vocabulary for failure modes in the system.
//! Remote failures are loud and travel to whoever asked for the page;
//! storage failures never appear here because the replica store absorbs
//! them (see [`crate::store`]).

use reqwest::StatusCode;
use thiserror::Error;

/// Why a single page request against the registry failed.
///
/// Produced by the page fetcher and propagated untouched to its caller:
/// the replica builder wraps it, the pagination coordinator surfaces it.
#[derive(Error, Debug)]
pub enum RemoteFetchError {
    #[error("Network failure fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Registry returned HTTP {status} for {url}{}", detail.as_deref().map(|d| format!(": {}", d)).unwrap_or_default())]
    HttpStatus {
        url: String,
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("Malformed registry response from {url}: {source} (body: {body_preview})")]
    MalformedResponse {
        url: String,
        #[source]
        source: serde_json::Error,
        body_preview: String,
    },
}

impl RemoteFetchError {
    /// HTTP status of the failed call, when the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status(),
            _ => None,
        }
    }
}

/// A full-catalog crawl stopped before the registry ran out of pages.
///
/// Whatever had been accumulated is discarded; the stored replica is
/// exactly what it was before the crawl started.
#[derive(Error, Debug)]
#[error("Replica crawl aborted after {pages_fetched} page(s), {entries_discarded} entries discarded: {cause}")]
pub struct ReplicaCrawlAborted {
    pub pages_fetched: usize,
    pub entries_discarded: usize,
    #[source]
    pub cause: RemoteFetchError,
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error(transparent)]
    RemoteFetch(#[from] RemoteFetchError),

    #[error(transparent)]
    CrawlAborted(#[from] ReplicaCrawlAborted),

    #[error("Pagination token {token} cannot be used in {mode} mode")]
    TokenMismatch { mode: String, token: String },

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error interacting with clipboard: {0}")]
    Clipboard(String),

    #[error("Output delivery failed: {}", failures.join(", "))]
    DeliveryFailed { failures: Vec<String> },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    ValidationError(#[from] crate::types::ValidationError),
}

impl From<arboard::Error> for AppError {
    fn from(err: arboard::Error) -> Self {
        AppError::Clipboard(format!("Clipboard error: {}", err))
    }
}
