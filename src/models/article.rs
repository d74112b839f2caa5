//! Article and author records produced by the affiliation pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder stored in [`AuthorRecord::emails`] when the affiliation holds no address
pub const NO_EMAIL: &str = "n/a";

/// Revision date of a record, kept as the raw tokens found in the payload.
///
/// No calendar validation or zero-padding is applied: `Display` joins the
/// three parts with `-` exactly as they were read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionDate {
    pub year: String,
    pub month: String,
    pub day: String,
}

impl RevisionDate {
    pub fn new(year: impl Into<String>, month: impl Into<String>, day: impl Into<String>) -> Self {
        Self {
            year: year.into(),
            month: month.into(),
            day: day.into(),
        }
    }
}

impl fmt::Display for RevisionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.year, self.month, self.day)
    }
}

/// An author whose affiliation was classified as non-academic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRecord {
    /// Given name and family name joined by a single space
    pub name: String,

    /// Raw affiliation text
    pub affiliation: String,

    /// Addresses found in the affiliation, or `["n/a"]` when there are none
    pub emails: Vec<String>,
}

impl AuthorRecord {
    /// Whether at least one real address was extracted
    pub fn has_email(&self) -> bool {
        !(self.emails.len() == 1 && self.emails[0] == NO_EMAIL)
    }
}

/// A record retained for export, together with its non-academic authors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Database identifier (PMID)
    pub id: String,

    /// Date the record was last revised
    pub revision_date: RevisionDate,

    /// Article title, empty when the payload had none
    pub title: String,

    /// Non-academic authors in document order
    pub authors: Vec<AuthorRecord>,
}

impl ArticleRecord {
    /// Author names joined with `"; "`
    pub fn author_names(&self) -> String {
        self.authors
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Affiliations joined with `"; "`
    pub fn affiliations(&self) -> String {
        self.authors
            .iter()
            .map(|a| a.affiliation.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Every author's emails, in order, joined with `", "`
    pub fn emails(&self) -> String {
        self.authors
            .iter()
            .flat_map(|a| a.emails.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
