//! Record sources: the search and fetch collaborators of the pipeline.
//!
//! A [`RecordSource`] turns a query into record identifiers and a set of
//! identifiers into one raw payload. [`PubMedSource`] talks to the NCBI
//! E-utilities API; [`MockSource`] returns canned values for tests.

pub mod mock;
mod pubmed;

pub use mock::MockSource;
pub use pubmed::{PubMedConfig, PubMedSource, PUBMED_EFETCH_URL, PUBMED_ESEARCH_URL};

use crate::models::SearchQuery;
use async_trait::async_trait;

/// Interface for databases that can be searched and fetched from.
#[async_trait]
pub trait RecordSource: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "pubmed")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Identifiers matching the query, in the order the database ranks them
    async fn search_ids(&self, query: &SearchQuery) -> Result<Vec<String>, SourceError>;

    /// One raw payload holding every record in `ids`
    async fn fetch_records(&self, ids: &[String]) -> Result<String, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Connection, DNS or timeout failure
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// HTTP 429 with optional `Retry-After` seconds
    #[error("Rate limit exceeded")]
    RateLimit(Option<u64>),

    /// The search response could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => SourceError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => SourceError::Network(err.to_string()),
        }
    }
}
