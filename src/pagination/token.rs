//! Pagination tokens: how to fetch a given page.

use crate::types::ValidationError;
use std::fmt;

/// Opaque continuation token issued by the registry.
///
/// Only the registry understands it; the crate stores and replays it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Synthetic marker for page N of a locally sliced result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalPageMarker(usize);

impl LocalPageMarker {
    pub fn new(page: usize) -> Result<Self, ValidationError> {
        if page == 0 {
            return Err(ValidationError::InvalidPageNumber(page));
        }
        Ok(Self(page))
    }

    /// Marker for `page`, or `None` for page 1 (start of sequence) and 0.
    pub fn for_page(page: usize) -> Option<Self> {
        (page > 1).then_some(Self(page))
    }

    pub fn page(self) -> usize {
        self.0
    }
}

impl fmt::Display for LocalPageMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {}", self.0)
    }
}

/// How to fetch a page: a registry cursor or a local page marker.
///
/// The two variants belong to different query paths and are never
/// interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageToken {
    Cursor(Cursor),
    LocalPage(LocalPageMarker),
}

impl PageToken {
    pub fn as_cursor(&self) -> Option<&Cursor> {
        match self {
            Self::Cursor(cursor) => Some(cursor),
            Self::LocalPage(_) => None,
        }
    }

    pub fn as_local_page(&self) -> Option<LocalPageMarker> {
        match self {
            Self::LocalPage(marker) => Some(*marker),
            Self::Cursor(_) => None,
        }
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cursor(cursor) => write!(f, "cursor '{}'", cursor),
            Self::LocalPage(marker) => write!(f, "{}", marker),
        }
    }
}
