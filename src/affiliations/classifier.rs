//! Keyword-based affiliation classifier and email extraction.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::parser::AuthorEntry;
use crate::models::{AuthorRecord, NO_EMAIL};

/// Keywords that mark an affiliation as academic
pub const DEFAULT_DENYLIST: [&str; 5] = ["University", "labs", "Institute", "College", "School"];

const EMAIL_PATTERN: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}";

/// How denylist keywords are matched against affiliation text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Case-sensitive literal substring anywhere in the text
    #[default]
    Substring,
    /// Case-sensitive keyword bounded by word boundaries on both sides
    WordBoundary,
}

fn email_regex() -> Option<&'static Regex> {
    static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| Regex::new(EMAIL_PATTERN).ok())
        .as_ref()
}

/// Extract every email-like token from `text`, first occurrence order, no repeats.
///
/// Returns `["n/a"]` when nothing matches.
pub fn extract_emails(text: &str) -> Vec<String> {
    let mut emails: Vec<String> = Vec::new();
    if let Some(re) = email_regex() {
        for m in re.find_iter(text) {
            if !emails.iter().any(|e| e == m.as_str()) {
                emails.push(m.as_str().to_string());
            }
        }
    }

    if emails.is_empty() {
        emails.push(NO_EMAIL.to_string());
    }
    emails
}

/// Decides whether an author's affiliation is academic.
///
/// The classifier holds no state besides its configuration, so the same
/// entry always yields the same result.
#[derive(Debug, Clone)]
pub struct AffiliationClassifier {
    denylist: Vec<String>,
    mode: MatchMode,
    // Only built for `MatchMode::WordBoundary` with a non-empty denylist
    boundary: Option<Regex>,
}

impl Default for AffiliationClassifier {
    fn default() -> Self {
        Self {
            denylist: DEFAULT_DENYLIST.iter().map(|k| k.to_string()).collect(),
            mode: MatchMode::Substring,
            boundary: None,
        }
    }
}

impl AffiliationClassifier {
    /// Build a classifier from a keyword list. Empty keywords are ignored.
    pub fn new<I, S>(denylist: I, mode: MatchMode) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let denylist: Vec<String> = denylist
            .into_iter()
            .map(Into::into)
            .filter(|k: &String| !k.is_empty())
            .collect();

        let boundary = match mode {
            MatchMode::WordBoundary if !denylist.is_empty() => {
                let alternation = denylist
                    .iter()
                    .map(|k| regex::escape(k))
                    .collect::<Vec<_>>()
                    .join("|");
                Some(Regex::new(&format!(r"\b(?:{})\b", alternation))?)
            }
            _ => None,
        };

        Ok(Self {
            denylist,
            mode,
            boundary,
        })
    }

    pub fn denylist(&self) -> &[String] {
        &self.denylist
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Whether the affiliation text names an academic institution
    pub fn is_academic(&self, affiliation: &str) -> bool {
        match self.mode {
            MatchMode::Substring => self.denylist.iter().any(|k| affiliation.contains(k.as_str())),
            MatchMode::WordBoundary => self
                .boundary
                .as_ref()
                .is_some_and(|re| re.is_match(affiliation)),
        }
    }

    /// Classify one author; `None` when the author has no affiliation or is academic.
    pub fn classify(&self, entry: &AuthorEntry) -> Option<AuthorRecord> {
        let affiliation = entry.affiliation.as_deref()?;

        if self.is_academic(affiliation) {
            tracing::trace!(affiliation, "academic affiliation");
            return None;
        }

        Some(AuthorRecord {
            name: entry.display_name(),
            affiliation: affiliation.to_string(),
            emails: extract_emails(affiliation),
        })
    }
}
