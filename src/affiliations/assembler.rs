//! Builds exportable records from parsed articles.

use serde::{Deserialize, Serialize};

use super::classifier::AffiliationClassifier;
use super::parser::ParsedArticle;
use crate::models::{ArticleRecord, AuthorRecord};

/// Which non-academic authors are kept per article
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorRetention {
    /// Every qualifying author, in document order
    #[default]
    All,
    /// Only the last qualifying author
    LastOnly,
}

/// Classify every author of every article and keep the articles with at
/// least one non-academic author. Article order is preserved.
pub fn assemble(
    articles: Vec<ParsedArticle>,
    classifier: &AffiliationClassifier,
    retention: AuthorRetention,
) -> Vec<ArticleRecord> {
    articles
        .into_iter()
        .filter_map(|article| {
            let mut authors: Vec<AuthorRecord> = article
                .authors
                .iter()
                .filter_map(|entry| classifier.classify(entry))
                .collect();

            if retention == AuthorRetention::LastOnly {
                authors = authors.pop().into_iter().collect();
            }

            if authors.is_empty() {
                tracing::debug!(pmid = %article.id, "no non-academic authors");
                return None;
            }

            tracing::debug!(
                pmid = %article.id,
                authors = authors.len(),
                with_email = authors.iter().filter(|a| a.has_email()).count(),
                "article kept"
            );

            Some(ArticleRecord {
                id: article.id,
                revision_date: article.revision_date,
                title: article.title,
                authors,
            })
        })
        .collect()
}
