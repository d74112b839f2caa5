//! Core data models for article records and search operations.

mod article;
mod search;

pub use article::{ArticleRecord, AuthorRecord, RevisionDate, NO_EMAIL};
pub use search::{SearchQuery, DEFAULT_MAX_RESULTS};
