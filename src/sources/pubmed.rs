//! PubMed record source using the E-utilities API.

use async_trait::async_trait;
use quick_xml::de::from_str;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::models::{SearchQuery, DEFAULT_MAX_RESULTS};
use crate::sources::{RecordSource, SourceError};
use crate::utils::{with_retry, HttpClient, HttpConfig, RetryConfig};

/// PubMed E-utilities API base URLs
pub const PUBMED_ESEARCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi";
pub const PUBMED_EFETCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi";

/// E-utilities endpoint and identification settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PubMedConfig {
    /// esearch endpoint
    pub search_url: String,

    /// efetch endpoint
    pub fetch_url: String,

    /// Default `retmax` when the query does not set one
    pub max_results: usize,

    /// NCBI API key (raises the rate limit from 3 to 10 requests/s)
    pub api_key: Option<String>,

    /// Contact address NCBI asks tools to register
    pub email: Option<String>,

    /// Tool name sent with every request
    pub tool: Option<String>,
}

impl Default for PubMedConfig {
    fn default() -> Self {
        Self {
            search_url: PUBMED_ESEARCH_URL.to_string(),
            fetch_url: PUBMED_EFETCH_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            api_key: None,
            email: None,
            tool: Some(env!("CARGO_PKG_NAME").to_string()),
        }
    }
}

/// PubMed record source
#[derive(Debug, Clone)]
pub struct PubMedSource {
    client: HttpClient,
    config: PubMedConfig,
    retry: RetryConfig,
}

impl PubMedSource {
    /// Create a new PubMed source
    pub fn new(
        config: PubMedConfig,
        http: &HttpConfig,
        retry: RetryConfig,
    ) -> Result<Self, SourceError> {
        Ok(Self::with_client(HttpClient::with_config(http)?, config, retry))
    }

    /// Create with a custom HTTP client (for testing)
    pub fn with_client(client: HttpClient, config: PubMedConfig, retry: RetryConfig) -> Self {
        Self {
            client,
            config,
            retry,
        }
    }

    /// Identification parameters appended to every request
    fn identity_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(tool) = &self.config.tool {
            params.push(("tool", tool.clone()));
        }
        if let Some(email) = &self.config.email {
            params.push(("email", email.clone()));
        }
        if let Some(key) = &self.config.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }

    fn encode_params(params: &[(&str, String)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Build E-utilities search URL
    fn build_search_url(&self, query: &SearchQuery) -> String {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("term", query.query.clone()),
            ("retmax", query.max_results.to_string()),
            ("retmode", "xml".to_string()),
        ];
        params.extend(self.identity_params());

        format!("{}?{}", self.config.search_url, Self::encode_params(&params))
    }

    /// Build E-utilities fetch URL for specific PubMed IDs
    fn build_fetch_url(&self, ids: &[String]) -> String {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("id", ids.join(",")),
            ("retmode", "xml".to_string()),
        ];
        params.extend(self.identity_params());

        format!("{}?{}", self.config.fetch_url, Self::encode_params(&params))
    }

    /// Parse E-utilities search response XML
    fn parse_search_response(xml: &str) -> Result<Vec<String>, SourceError> {
        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct ESearchResult {
            IdList: Option<IdList>,
            ERROR: Option<String>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct IdList {
            #[serde(rename = "Id", default)]
            ids: Vec<String>,
        }

        let result: ESearchResult = from_str(xml)
            .map_err(|e| SourceError::Parse(format!("Failed to parse PubMed search XML: {}", e)))?;

        match (result.IdList, result.ERROR) {
            (Some(list), _) => Ok(list.ids),
            (None, Some(message)) => Err(SourceError::InvalidRequest(message)),
            (None, None) => Ok(Vec::new()),
        }
    }

    async fn get_text(&self, url: String, what: &'static str) -> Result<String, SourceError> {
        let client = self.client.clone();

        with_retry(self.retry, || {
            let client = client.clone();
            let url = url.clone();
            async move {
                let response = client.client().get(&url).send().await.map_err(|e| {
                    SourceError::Network(format!("Failed to {} PubMed: {}", what, e))
                })?;

                let status = response.status();
                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok());
                    tracing::debug!("PubMed API rate-limited");
                    return Err(SourceError::RateLimit(retry_after));
                }
                if !status.is_success() {
                    return Err(SourceError::Http {
                        status: status.as_u16(),
                        message: format!("PubMed {} returned {}", what, status),
                    });
                }

                response
                    .text()
                    .await
                    .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))
            }
        })
        .await
    }
}

#[async_trait]
impl RecordSource for PubMedSource {
    fn id(&self) -> &str {
        "pubmed"
    }

    fn name(&self) -> &str {
        "PubMed"
    }

    async fn search_ids(&self, query: &SearchQuery) -> Result<Vec<String>, SourceError> {
        if query.query.trim().is_empty() {
            return Err(SourceError::InvalidRequest("empty search query".to_string()));
        }

        let xml = self.get_text(self.build_search_url(query), "search").await?;
        let ids = Self::parse_search_response(&xml)?;
        tracing::info!("PubMed search returned {} ids", ids.len());
        Ok(ids)
    }

    async fn fetch_records(&self, ids: &[String]) -> Result<String, SourceError> {
        if ids.is_empty() {
            return Err(SourceError::InvalidRequest("no identifiers to fetch".to_string()));
        }

        let xml = self.get_text(self.build_fetch_url(ids), "fetch").await?;
        tracing::debug!("fetched {} bytes for {} ids", xml.len(), ids.len());
        Ok(xml)
    }
}
