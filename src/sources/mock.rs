//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::models::SearchQuery;
use crate::sources::{RecordSource, SourceError};

/// A mock source for testing that returns predefined responses.
///
/// Unset responses behave like an empty database: no ids and an empty
/// payload. `fail_*` switches make the matching call return a network error.
#[derive(Debug, Default)]
pub struct MockSource {
    ids: Mutex<Vec<String>>,
    payload: Mutex<String>,
    fail_search: bool,
    fail_fetch: bool,
    fetched: Mutex<Vec<Vec<String>>>,
}

impl MockSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that returns `ids` from search and `payload` from fetch.
    pub fn with_response<I, S>(ids: I, payload: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: Mutex::new(ids.into_iter().map(Into::into).collect()),
            payload: Mutex::new(payload.into()),
            ..Default::default()
        }
    }

    /// Make `search_ids` fail with a network error.
    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    /// Make `fetch_records` fail with a network error.
    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    /// Set the payload to return.
    pub fn set_payload(&self, payload: impl Into<String>) {
        if let Ok(mut guard) = self.payload.lock() {
            *guard = payload.into();
        }
    }

    /// Identifier sets passed to `fetch_records`, in call order.
    pub fn fetched(&self) -> Vec<Vec<String>> {
        self.fetched
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

fn poisoned() -> SourceError {
    SourceError::Network("mock state poisoned".to_string())
}

#[async_trait]
impl RecordSource for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn search_ids(&self, query: &SearchQuery) -> Result<Vec<String>, SourceError> {
        if self.fail_search {
            return Err(SourceError::Network("mock search failure".to_string()));
        }
        let ids = self.ids.lock().map_err(|_| poisoned())?;
        Ok(ids.iter().take(query.max_results).cloned().collect())
    }

    async fn fetch_records(&self, ids: &[String]) -> Result<String, SourceError> {
        if let Ok(mut fetched) = self.fetched.lock() {
            fetched.push(ids.to_vec());
        }
        if self.fail_fetch {
            return Err(SourceError::Network("mock fetch failure".to_string()));
        }
        let payload = self.payload.lock().map_err(|_| poisoned())?;
        Ok(payload.clone())
    }
}
