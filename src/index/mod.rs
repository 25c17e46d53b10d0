//! The local replica: building it, filtering it and querying it.

pub mod builder;
pub mod filter;
pub mod query;

pub use builder::{crawl_all, BuildOutcome, CrawlResult, ReplicaBuilder};
pub use filter::{FilterKind, FilterSet};
pub use query::{slice_page, QueryEngine, QueryMode, QueryPage, QueryParams};
