//! Query error types
//!
//! Construction of a query document never fails; the store rejects malformed
//! documents on its own. The only checked failures live at the edges: encoding
//! a document, decoding one, and parsing catalog strings.

use thiserror::Error;

/// Errors that can occur while encoding or decoding query documents
#[derive(Error, Debug)]
pub enum QueryError {
    /// The document could not be rendered to JSON
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The input was not a valid query document
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// A catalog string did not match any known variant
    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

impl QueryError {
    pub(crate) fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        QueryError::UnknownVariant {
            kind,
            value: value.into(),
        }
    }
}

/// Encode-side conversion; decoding maps to `Deserialization` explicitly.
impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::Serialization(err.to_string())
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
