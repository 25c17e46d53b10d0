// src/api/parser.rs
//! Decoding of registry responses into catalog pages.

use super::client::ApiResponse;
use super::responses::{ProblemDetails, ServerListResponse};
use super::CatalogPage;
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::RemoteFetchError;

/// Parses a listing response, turning non-2xx statuses into errors.
pub fn parse_page_response(result: ApiResponse<String>) -> Result<CatalogPage, RemoteFetchError> {
    if !result.status.is_success() {
        return Err(parse_error_response(&result));
    }

    let response: ServerListResponse = serde_json::from_str(&result.data).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", result.url, e);
        RemoteFetchError::MalformedResponse {
            url: result.url.clone(),
            source: e,
            body_preview: preview(&result.data),
        }
    })?;

    // The registry signals the end with a missing or empty cursor.
    let next_cursor = response.metadata.next_cursor.filter(|c| !c.is_empty());

    log::debug!(
        "Parsed {} servers from {} (next cursor: {})",
        response.servers.len(),
        result.url,
        next_cursor.as_deref().unwrap_or("none")
    );

    Ok(CatalogPage {
        entries: response.servers,
        next_cursor,
    })
}

/// Builds the error for a non-success response, keeping the problem detail
/// when the body is a problem document.
fn parse_error_response(result: &ApiResponse<String>) -> RemoteFetchError {
    let detail = serde_json::from_str::<ProblemDetails>(&result.data)
        .ok()
        .and_then(|p| p.message())
        .or_else(|| {
            let trimmed = result.data.trim();
            (!trimmed.is_empty()).then(|| preview(trimmed))
        });

    RemoteFetchError::HttpStatus {
        url: result.url.clone(),
        status: result.status,
        detail,
    }
}

fn preview(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let cut: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}
