//! Search, fetch, parse and classify in one call.

use crate::affiliations::{extract_non_academic, AffiliationClassifier, AuthorRetention, ParseError};
use crate::models::{ArticleRecord, SearchQuery};
use crate::sources::RecordSource;

/// Where a pipeline run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The search produced no identifiers
    NoIds,
    /// The fetch produced no payload
    NoPayload,
    /// The payload had no article with a non-academic author
    NoAuthors,
    /// Records ready for export
    Records(Vec<ArticleRecord>),
}

impl PipelineOutcome {
    /// Message shown to the user when the run stopped early
    pub fn message(&self) -> Option<&'static str> {
        match self {
            PipelineOutcome::NoIds => Some("No paper IDs fetched."),
            PipelineOutcome::NoPayload => Some("No paper details fetched."),
            PipelineOutcome::NoAuthors => Some("No non-academic authors found."),
            PipelineOutcome::Records(_) => None,
        }
    }
}

/// Errors that abort a pipeline run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to parse fetched records: {0}")]
    Parse(#[from] ParseError),
}

/// Run one query through the source and the classifier.
///
/// Source failures are logged and reported as an empty stage, never as an
/// error. Only a payload that cannot be decoded fails the run.
pub async fn run(
    source: &dyn RecordSource,
    query: &SearchQuery,
    classifier: &AffiliationClassifier,
    retention: AuthorRetention,
) -> Result<PipelineOutcome, PipelineError> {
    let ids = match source.search_ids(query).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!("{} search failed: {}", source.name(), e);
            Vec::new()
        }
    };
    if ids.is_empty() {
        return Ok(PipelineOutcome::NoIds);
    }
    tracing::debug!(source = source.id(), count = ids.len(), "fetching records");

    let payload = match source.fetch_records(&ids).await {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("{} fetch failed: {}", source.name(), e);
            String::new()
        }
    };
    if payload.trim().is_empty() {
        return Ok(PipelineOutcome::NoPayload);
    }

    let records = extract_non_academic(&payload, classifier, retention)?;
    tracing::info!("{} of {} records have non-academic authors", records.len(), ids.len());

    if records.is_empty() {
        Ok(PipelineOutcome::NoAuthors)
    } else {
        Ok(PipelineOutcome::Records(records))
    }
}
