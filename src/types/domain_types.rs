// src/types/domain_types.rs
//! Domain-specific newtypes for type safety and validation.

use super::ValidationError;
use crate::constants::{MAX_RESULTS_PER_PAGE, MIN_RESULTS_PER_PAGE};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Number of entries shown per page.
///
/// Any size up to `MAX_RESULTS_PER_PAGE` is a valid slice size; the registry
/// rejects larger limits. The user-facing preference is narrower, see
/// [`PageSize::preference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PageSize(u32);

impl PageSize {
    /// Create a page size with bounds validation
    pub fn new(value: u32) -> Result<Self, ValidationError> {
        Self::bounded(value, 1)
    }

    /// A page size chosen by the user: `MIN_RESULTS_PER_PAGE..=MAX_RESULTS_PER_PAGE`.
    pub fn preference(value: u32) -> Result<Self, ValidationError> {
        Self::bounded(value, MIN_RESULTS_PER_PAGE)
    }

    fn bounded(value: u32, min: u32) -> Result<Self, ValidationError> {
        if !(min..=MAX_RESULTS_PER_PAGE).contains(&value) {
            return Err(ValidationError::OutOfBounds {
                value,
                min,
                max: MAX_RESULTS_PER_PAGE,
            });
        }
        Ok(Self(value))
    }

    /// The page size used when crawling the whole catalog.
    pub fn crawl() -> Self {
        Self(MAX_RESULTS_PER_PAGE)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(crate::constants::DEFAULT_RESULTS_PER_PAGE)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for PageSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u32::deserialize(deserializer)?;
        PageSize::new(value).map_err(serde::de::Error::custom)
    }
}

/// Base URL of a registry's server listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryUrl(Url);

impl Serialize for RegistryUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.as_str().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RegistryUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RegistryUrl::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl RegistryUrl {
    /// Create a new validated registry URL
    pub fn parse(url: &str) -> Result<Self, ValidationError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ValidationError::EmptyField("registry url"));
        }
        match Url::parse(url) {
            Ok(parsed_url) => {
                if parsed_url.scheme() != "http" && parsed_url.scheme() != "https" {
                    return Err(ValidationError::InvalidUrl {
                        url: url.to_string(),
                        reason: "Only HTTP and HTTPS URLs are supported".to_string(),
                    });
                }
                Ok(Self(parsed_url))
            }
            Err(e) => Err(ValidationError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Get the underlying URL
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl Default for RegistryUrl {
    fn default() -> Self {
        Self(Url::parse(crate::constants::DEFAULT_REGISTRY_URL).expect("default registry URL is valid"))
    }
}

impl fmt::Display for RegistryUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses an `updated_since` filter.
///
/// Accepts a full RFC 3339 timestamp or a bare `YYYY-MM-DD` date, which is
/// taken as midnight UTC.
pub fn parse_updated_since(input: &str) -> Result<DateTime<Utc>, ValidationError> {
    let input = input.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| ValidationError::InvalidTimestamp {
            input: input.to_string(),
            reason: "expected RFC 3339 or YYYY-MM-DD".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_bounds() {
        assert!(PageSize::new(0).is_err());
        assert!(PageSize::new(101).is_err());
        assert_eq!(PageSize::new(2).unwrap().get(), 2);
        assert!(PageSize::preference(2).is_err());
        assert_eq!(PageSize::preference(3).unwrap().get(), 3);
        assert_eq!(PageSize::new(100).unwrap().get(), 100);
        assert_eq!(PageSize::default().get(), 60);
    }

    #[test]
    fn page_size_rejects_out_of_range_json() {
        assert!(serde_json::from_str::<PageSize>("500").is_err());
        assert_eq!(serde_json::from_str::<PageSize>("12").unwrap().get(), 12);
    }

    #[test]
    fn registry_url_requires_http() {
        assert!(RegistryUrl::parse("ftp://registry.example/v0/servers").is_err());
        assert!(RegistryUrl::parse("   ").is_err());
        let url = RegistryUrl::parse("https://registry.example/v0/servers").unwrap();
        assert_eq!(url.as_str(), "https://registry.example/v0/servers");
    }

    #[test]
    fn updated_since_accepts_dates_and_timestamps() {
        let day = parse_updated_since("2025-09-01").unwrap();
        assert_eq!(day.to_rfc3339(), "2025-09-01T00:00:00+00:00");

        let ts = parse_updated_since("2025-09-01T12:30:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-09-01T10:30:00+00:00");

        assert!(parse_updated_since("last tuesday").is_err());
    }
}
