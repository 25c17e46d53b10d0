use thiserror::Error;

mod domain_types;

pub use domain_types::*;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Value out of bounds: {value}, expected {min}..={max}")]
    OutOfBounds { value: u32, min: u32, max: u32 },

    #[error("Page numbers start at 1, got {0}")]
    InvalidPageNumber(usize),

    #[error("Invalid timestamp {input}: {reason}")]
    InvalidTimestamp { input: String, reason: String },

    #[error("Invalid filter '{input}': {reason}")]
    InvalidFilter { input: String, reason: String },

    #[error("Invalid setting for {field}: {reason}")]
    InvalidOverride { field: String, reason: String },

    #[error("Empty required field: {0}")]
    EmptyField(&'static str),
}
