//! # PubMed Affiliations
//!
//! Finds PubMed articles with at least one author affiliated with a
//! non-academic organization (companies, hospitals, agencies) and exports
//! them as CSV.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (ArticleRecord, AuthorRecord, SearchQuery)
//! - [`sources`]: The [`RecordSource`] trait and the E-utilities client
//! - [`affiliations`]: XML parsing, affiliation classification and record assembly
//! - [`pipeline`]: Search, fetch and classify in one call
//! - [`export`]: CSV output and terminal rendering
//! - [`utils`]: HTTP client and retry helpers
//! - [`config`]: Configuration management

pub mod affiliations;
pub mod config;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use affiliations::{AffiliationClassifier, AuthorRetention, MatchMode};
pub use models::{ArticleRecord, AuthorRecord, SearchQuery};
pub use pipeline::{PipelineError, PipelineOutcome};
pub use sources::{PubMedSource, RecordSource, SourceError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
