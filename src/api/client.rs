// src/api/client.rs
//! Thin HTTP client for the registry listing endpoint.
//!
//! Builds the request URL, performs one GET, and hands the raw body to the
//! parser. No retries, no caching.

use super::{CatalogPage, CatalogSource, PageQuery};
use crate::constants::{REGISTRY_ACCEPT, REGISTRY_VERSION_FILTER};
use crate::error::{AppError, RemoteFetchError};
use crate::types::RegistryUrl;
use chrono::SecondsFormat;
use reqwest::{header, Client, Response};
use url::Url;

/// A thin wrapper around reqwest Client for registry requests.
#[derive(Clone)]
pub struct RegistryHttpClient {
    client: Client,
    base: RegistryUrl,
}

impl RegistryHttpClient {
    /// Creates a new HTTP client for the given listing endpoint.
    pub fn new(base: RegistryUrl) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers())
            .user_agent(concat!("mcp-catalog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::InternalError {
                message: "Failed to build HTTP client".to_string(),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { client, base })
    }

    fn create_headers() -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(REGISTRY_ACCEPT),
        );
        headers
    }

    /// Performs the GET for `url`.
    async fn get(&self, url: Url) -> Result<Response, RemoteFetchError> {
        log::debug!("GET {}", url);
        let url_text = url.to_string();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| RemoteFetchError::Transport {
                url: url_text,
                source,
            })?;
        log::debug!("{} -> {}", response.url(), response.status());
        Ok(response)
    }
}

/// Builds the listing URL for a query.
///
/// Parameters are appended to whatever query string the base URL already
/// carries, in the order the registry documents them.
pub fn build_listing_url(base: &RegistryUrl, query: &PageQuery) -> Url {
    let mut url = base.as_url().clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("version", REGISTRY_VERSION_FILTER);
        pairs.append_pair("limit", &query.page_size.to_string());
        if !query.search.is_empty() {
            pairs.append_pair("search", &query.search);
        }
        if let Some(cursor) = &query.cursor {
            pairs.append_pair("cursor", cursor);
        }
        if let Some(since) = &query.updated_since {
            pairs.append_pair(
                "updated_since",
                &since.to_rfc3339_opts(SecondsFormat::Millis, true),
            );
        }
    }
    url
}

#[async_trait::async_trait]
impl CatalogSource for RegistryHttpClient {
    async fn fetch_page(&self, query: &PageQuery) -> Result<CatalogPage, RemoteFetchError> {
        let url = build_listing_url(&self.base, query);
        let response = self.get(url).await?;
        let result = extract_response_text(response).await?;
        super::parser::parse_page_response(result)
    }

    fn describe(&self) -> String {
        self.base.to_string()
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Extracts the response body as text with metadata.
pub async fn extract_response_text(
    response: Response,
) -> Result<ApiResponse<String>, RemoteFetchError> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response
        .text()
        .await
        .map_err(|source| RemoteFetchError::Transport {
            url: url.clone(),
            source,
        })?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}
