//! Record parsing and affiliation classification.
//!
//! This is the synchronous core of the crate:
//!
//! - [`parse`]: decode an `efetch` XML payload into [`ParsedArticle`]s
//! - [`AffiliationClassifier`]: decide academic vs. non-academic per author
//! - [`assemble`]: keep articles with at least one non-academic author
//!
//! Nothing here performs I/O; all network work happens in [`crate::sources`].

mod assembler;
mod classifier;
mod parser;

pub use assembler::{assemble, AuthorRetention};
pub use classifier::{extract_emails, AffiliationClassifier, MatchMode, DEFAULT_DENYLIST};
pub use parser::{parse, AuthorEntry, ParseError, ParsedArticle, MAX_DEPTH};

use crate::models::ArticleRecord;

/// Parse a payload and assemble the exportable records in one step.
pub fn extract_non_academic(
    payload: &str,
    classifier: &AffiliationClassifier,
    retention: AuthorRetention,
) -> Result<Vec<ArticleRecord>, ParseError> {
    let articles = parse(payload)?;
    Ok(assemble(articles, classifier, retention))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_article_scenario() {
        let payload = r#"<PubmedArticleSet>
  <PubmedArticle><MedlineCitation>
    <PMID>100</PMID>
    <DateRevised><Year>2024</Year><Month>05</Month><Day>01</Day></DateRevised>
    <Article><ArticleTitle>Article A</ArticleTitle><AuthorList>
      <Author><LastName>Dias</LastName><ForeName>Rui</ForeName>
        <AffiliationInfo><Affiliation>Genentech, rd@gene.com</Affiliation></AffiliationInfo>
      </Author>
    </AuthorList></Article>
  </MedlineCitation></PubmedArticle>
  <PubmedArticle><MedlineCitation>
    <PMID>200</PMID>
    <Article><ArticleTitle>Article B</ArticleTitle><AuthorList>
      <Author><LastName>Lee</LastName><ForeName>Kim</ForeName>
        <AffiliationInfo><Affiliation>Massachusetts Institute of Technology (MIT)</Affiliation></AffiliationInfo>
      </Author>
    </AuthorList></Article>
  </MedlineCitation></PubmedArticle>
</PubmedArticleSet>"#;

        let records = extract_non_academic(
            payload,
            &AffiliationClassifier::default(),
            AuthorRetention::All,
        )
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "100");
        assert_eq!(records[0].title, "Article A");
        assert_eq!(records[0].authors[0].name, "Rui Dias");
        assert_eq!(records[0].authors[0].emails, vec!["rd@gene.com"]);
    }

    #[test]
    fn test_malformed_payload_has_no_partial_result() {
        let result = extract_non_academic(
            "<PubmedArticleSet><PubmedArticle>",
            &AffiliationClassifier::default(),
            AuthorRetention::All,
        );
        assert!(result.is_err());
    }
}
