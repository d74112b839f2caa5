//! PubMed `efetch` payload parser.
//!
//! The payload is first read into a small element tree with `quick_xml`'s
//! event reader, then each `PubmedArticle` is walked with optional lookups.
//! Only a payload that cannot be read as a tree at all is an error; any
//! node missing inside an article falls back to an empty value.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::models::RevisionDate;

/// Deepest element nesting accepted in a payload
pub const MAX_DEPTH: usize = 256;

/// Errors raised when the payload is not a well-formed document
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The XML reader rejected the input
    #[error("malformed XML at byte {position}: {message}")]
    Xml { position: u64, message: String },

    /// Input ended while an element was still open
    #[error("unexpected end of document inside <{0}>")]
    Unclosed(String),

    /// Non-whitespace text found outside the root element
    #[error("text content outside of the root element")]
    TextOutsideRoot,

    /// A second top-level element followed the root
    #[error("more than one root element")]
    MultipleRoots,

    /// The input contained no element at all
    #[error("document has no root element")]
    NoRoot,

    /// Elements nested deeper than [`MAX_DEPTH`]
    #[error("elements nested deeper than {0} levels")]
    TooDeep(usize),
}

/// An author entry exactly as found under `AuthorList`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorEntry {
    pub fore_name: Option<String>,
    pub last_name: Option<String>,
    /// Text of the first `AffiliationInfo/Affiliation`, if any
    pub affiliation: Option<String>,
}

impl AuthorEntry {
    /// Given name and family name joined by one space; a missing part
    /// leaves its slot empty.
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.fore_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
    }
}

/// One article before classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArticle {
    pub id: String,
    pub revision_date: RevisionDate,
    pub title: String,
    pub authors: Vec<AuthorEntry>,
}

#[derive(Debug)]
enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug)]
struct Element {
    name: String,
    children: Vec<Node>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Vec::new(),
        }
    }

    fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |e| e.name == name)
    }

    fn path(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |node, name| node.child(name))
    }

    /// Concatenated text of this node and all descendants, in document order
    fn raw_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    /// Like [`Element::raw_text`], trimmed
    fn text(&self) -> String {
        self.raw_text().trim().to_string()
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Outermost descendants with the given name, in document order
    fn find_all<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        for e in self.elements() {
            if e.name == name {
                out.push(e);
            } else {
                e.find_all(name, out);
            }
        }
    }
}

fn xml_error(reader: &Reader<&[u8]>, err: impl std::fmt::Display) -> ParseError {
    ParseError::Xml {
        position: reader.buffer_position() as u64,
        message: err.to_string(),
    }
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_some() => return Err(ParseError::MultipleRoots),
        None => *root = Some(element),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: String) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Text(text)),
        None if text.trim().is_empty() => {}
        None => return Err(ParseError::TextOutsideRoot),
    }
    Ok(())
}

fn read_tree(xml: &str) -> Result<Element, ParseError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if stack.is_empty() && root.is_some() {
                    return Err(ParseError::MultipleRoots);
                }
                // text lookups and drop recurse once per level
                if stack.len() >= MAX_DEPTH {
                    return Err(ParseError::TooDeep(MAX_DEPTH));
                }
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                stack.push(Element::new(name));
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                attach(&mut stack, &mut root, Element::new(name))?;
            }
            Ok(Event::End(e)) => {
                let element = stack.pop().ok_or_else(|| {
                    xml_error(
                        &reader,
                        format!(
                            "unmatched closing tag </{}>",
                            String::from_utf8_lossy(e.local_name().as_ref())
                        ),
                    )
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| xml_error(&reader, e))?;
                push_text(&mut stack, text.into_owned())?;
            }
            Ok(Event::CData(t)) => {
                let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                push_text(&mut stack, text)?;
            }
            Ok(Event::Eof) => break,
            // declarations, comments, processing instructions, doctype
            Ok(_) => {}
            Err(e) => return Err(xml_error(&reader, e)),
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::Unclosed(open.name.clone()));
    }
    root.ok_or(ParseError::NoRoot)
}

fn leaf_text(node: Option<&Element>) -> String {
    node.map(Element::text).unwrap_or_default()
}

fn optional_text(node: Option<&Element>) -> Option<String> {
    node.map(Element::text)
}

fn parse_revision_date(citation: &Element, id: &str) -> RevisionDate {
    match citation.child("DateRevised") {
        Some(date) => RevisionDate {
            year: leaf_text(date.child("Year")),
            month: leaf_text(date.child("Month")),
            day: leaf_text(date.child("Day")),
        },
        None => {
            tracing::debug!(pmid = id, "record has no DateRevised node");
            RevisionDate::default()
        }
    }
}

fn parse_author(author: &Element) -> AuthorEntry {
    let affiliation = author
        .path(&["AffiliationInfo", "Affiliation"])
        .map(Element::raw_text)
        .filter(|text| !text.trim().is_empty());

    AuthorEntry {
        fore_name: optional_text(author.child("ForeName")),
        last_name: optional_text(author.child("LastName")),
        affiliation,
    }
}

fn parse_article(node: &Element) -> ParsedArticle {
    let Some(citation) = node.child("MedlineCitation") else {
        tracing::debug!("PubmedArticle has no MedlineCitation node");
        return ParsedArticle::default();
    };

    let id = leaf_text(citation.child("PMID"));
    if id.is_empty() {
        tracing::debug!("record has no PMID");
    }

    let revision_date = parse_revision_date(citation, &id);

    let Some(article) = citation.child("Article") else {
        tracing::debug!(pmid = %id, "record has no Article node");
        return ParsedArticle {
            id,
            revision_date,
            ..Default::default()
        };
    };

    let title = match article.child("ArticleTitle") {
        Some(title) => title.text(),
        None => {
            tracing::debug!(pmid = %id, "record has no ArticleTitle");
            String::new()
        }
    };

    let authors = match article.child("AuthorList") {
        Some(list) => list.children_named("Author").map(parse_author).collect(),
        None => {
            tracing::debug!(pmid = %id, "record has no AuthorList");
            Vec::new()
        }
    };

    ParsedArticle {
        id,
        revision_date,
        title,
        authors,
    }
}

/// Parse a PubMed `efetch` XML payload into articles, in document order.
pub fn parse(payload: &str) -> Result<Vec<ParsedArticle>, ParseError> {
    let root = read_tree(payload)?;

    let mut nodes = Vec::new();
    if root.name == "PubmedArticle" {
        nodes.push(&root);
    } else {
        root.find_all("PubmedArticle", &mut nodes);
    }

    let articles: Vec<ParsedArticle> = nodes.into_iter().map(parse_article).collect();
    tracing::debug!("parsed {} articles from payload", articles.len());
    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_ARTICLES: &str = r#"<?xml version="1.0" ?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2024//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd">
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation Status="MEDLINE" Owner="NLM">
      <PMID Version="1">38000001</PMID>
      <DateRevised><Year>2024</Year><Month>02</Month><Day>15</Day></DateRevised>
      <Article PubModel="Print">
        <ArticleTitle>Targeting <i>KRAS</i> in lung cancer.</ArticleTitle>
        <AuthorList CompleteYN="Y">
          <Author ValidYN="Y">
            <LastName>Doe</LastName>
            <ForeName>Jane</ForeName>
            <AffiliationInfo><Affiliation>Acme Biotech Inc, jane@acme.com</Affiliation></AffiliationInfo>
            <AffiliationInfo><Affiliation>Second affiliation</Affiliation></AffiliationInfo>
          </Author>
          <Author ValidYN="Y">
            <LastName>Roe</LastName>
            <ForeName>Rick</ForeName>
          </Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
  <PubmedArticle>
    <MedlineCitation>
      <PMID>38000002</PMID>
      <DateRevised><Year>2023</Year><Month>1</Month><Day>5</Day></DateRevised>
      <Article>
        <AuthorList>
          <Author><LastName>Solo</LastName></Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
  <PubmedArticle>
    <MedlineCitation>
      <PMID>38000003</PMID>
      <DateRevised><Year>2022</Year><Month>12</Month><Day>31</Day></DateRevised>
      <Article>
        <ArticleTitle>Protein folding in yeast.</ArticleTitle>
        <AuthorList>
          <Author>
            <LastName>Okafor</LastName>
            <ForeName>Chidi</ForeName>
            <AffiliationInfo><Affiliation>Pfizer Inc, chidi@pfizer.com</Affiliation></AffiliationInfo>
          </Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

    #[test]
    fn test_parse_extracts_fields_in_order() {
        let articles = parse(THREE_ARTICLES).unwrap();
        assert_eq!(articles.len(), 3);

        let first = &articles[0];
        assert_eq!(first.id, "38000001");
        assert_eq!(first.revision_date, RevisionDate::new("2024", "02", "15"));
        assert_eq!(first.title, "Targeting KRAS in lung cancer.");
        assert_eq!(first.authors.len(), 2);
        assert_eq!(first.authors[0].display_name(), "Jane Doe");
        assert_eq!(
            first.authors[0].affiliation.as_deref(),
            Some("Acme Biotech Inc, jane@acme.com")
        );
        assert_eq!(first.authors[1].affiliation, None);

        assert_eq!(articles[1].id, "38000002");
    }

    #[test]
    fn test_missing_title_defaults_to_empty() {
        let articles = parse(THREE_ARTICLES).unwrap();
        let second = &articles[1];
        assert_eq!(second.title, "");
        assert_eq!(second.revision_date.to_string(), "2023-1-5");
        assert_eq!(second.authors.len(), 1);

        let third = &articles[2];
        assert_eq!(third.id, "38000003");
        assert_eq!(third.revision_date.to_string(), "2022-12-31");
        assert_eq!(third.title, "Protein folding in yeast.");
        assert_eq!(third.authors.len(), 1);
        assert_eq!(third.authors[0].display_name(), "Chidi Okafor");
        assert_eq!(
            third.authors[0].affiliation.as_deref(),
            Some("Pfizer Inc, chidi@pfizer.com")
        );
    }

    #[test]
    fn test_missing_name_parts_leave_empty_slots() {
        let articles = parse(THREE_ARTICLES).unwrap();
        assert_eq!(articles[1].authors[0].display_name(), " Solo");
    }

    #[test]
    fn test_missing_author_list_yields_no_authors() {
        let xml = r#"<PubmedArticleSet><PubmedArticle><MedlineCitation>
            <PMID>1</PMID><Article><ArticleTitle>Lonely</ArticleTitle></Article>
            </MedlineCitation></PubmedArticle></PubmedArticleSet>"#;
        let articles = parse(xml).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Lonely");
        assert!(articles[0].authors.is_empty());
        assert_eq!(articles[0].revision_date, RevisionDate::default());
    }

    #[test]
    fn test_missing_article_node_keeps_id() {
        let xml = "<PubmedArticleSet><PubmedArticle><MedlineCitation><PMID>9</PMID>\
                   </MedlineCitation></PubmedArticle></PubmedArticleSet>";
        let articles = parse(xml).unwrap();
        assert_eq!(articles[0].id, "9");
        assert!(articles[0].authors.is_empty());
    }

    #[test]
    fn test_entities_are_unescaped() {
        let xml = "<PubmedArticleSet><PubmedArticle><MedlineCitation><PMID>3</PMID>\
                   <Article><ArticleTitle>A &amp; B &lt;C&gt;</ArticleTitle></Article>\
                   </MedlineCitation></PubmedArticle></PubmedArticleSet>";
        let articles = parse(xml).unwrap();
        assert_eq!(articles[0].title, "A & B <C>");
    }

    #[test]
    fn test_empty_affiliation_is_treated_as_absent() {
        let xml = "<PubmedArticleSet><PubmedArticle><MedlineCitation><PMID>4</PMID>\
                   <Article><AuthorList><Author><LastName>X</LastName>\
                   <AffiliationInfo><Affiliation/></AffiliationInfo></Author></AuthorList>\
                   </Article></MedlineCitation></PubmedArticle></PubmedArticleSet>";
        let articles = parse(xml).unwrap();
        assert_eq!(articles[0].authors[0].affiliation, None);
    }

    #[test]
    fn test_affiliation_keeps_surrounding_whitespace() {
        let xml = "<PubmedArticleSet><PubmedArticle><MedlineCitation><PMID>5</PMID>\
                   <Article><AuthorList><Author><LastName>X</LastName>\
                   <AffiliationInfo><Affiliation>  Acme Inc  </Affiliation></AffiliationInfo>\
                   </Author></AuthorList></Article></MedlineCitation></PubmedArticle></PubmedArticleSet>";
        let articles = parse(xml).unwrap();
        assert_eq!(articles[0].authors[0].affiliation.as_deref(), Some("  Acme Inc  "));
    }

    #[test]
    fn test_whitespace_affiliation_is_treated_as_absent() {
        let xml = "<PubmedArticleSet><PubmedArticle><MedlineCitation><PMID>6</PMID>\
                   <Article><AuthorList><Author><LastName>X</LastName>\
                   <AffiliationInfo><Affiliation>   </Affiliation></AffiliationInfo>\
                   </Author></AuthorList></Article></MedlineCitation></PubmedArticle></PubmedArticleSet>";
        let articles = parse(xml).unwrap();
        assert_eq!(articles[0].authors[0].affiliation, None);
    }

    fn nested_title(depth: usize) -> String {
        format!(
            "<PubmedArticleSet><PubmedArticle><MedlineCitation><PMID>7</PMID>\
             <Article><ArticleTitle>{}x{}</ArticleTitle></Article>\
             </MedlineCitation></PubmedArticle></PubmedArticleSet>",
            "<i>".repeat(depth),
            "</i>".repeat(depth)
        )
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        assert!(matches!(
            parse(&nested_title(50_000)),
            Err(ParseError::TooDeep(MAX_DEPTH))
        ));
    }

    #[test]
    fn test_nesting_below_limit_parses() {
        let articles = parse(&nested_title(200)).unwrap();
        assert_eq!(articles[0].title, "x");
    }

    #[test]
    fn test_empty_set_yields_no_articles() {
        assert!(parse("<PubmedArticleSet></PubmedArticleSet>").unwrap().is_empty());
        assert!(parse("<PubmedArticleSet/>").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_payloads_are_rejected() {
        assert!(matches!(parse("not xml at all"), Err(ParseError::TextOutsideRoot)));
        assert!(matches!(parse(""), Err(ParseError::NoRoot)));
        assert!(parse("<PubmedArticleSet><PubmedArticle>").is_err());
        assert!(parse("<a><b></a></b>").is_err());
        assert!(matches!(parse("<a/><b/>"), Err(ParseError::MultipleRoots)));
    }
}
