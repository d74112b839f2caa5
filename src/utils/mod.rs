//! Transport utilities used by the record sources.
//!
//! - [`HttpClient`]: shared `reqwest` client built from [`HttpConfig`]
//! - [`with_retry`]: execute a request with retry on transient errors
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use pubmed_affiliations::utils::{with_retry, RetryConfig};
//! use pubmed_affiliations::sources::SourceError;
//!
//! # async fn fetch_data() -> Result<String, SourceError> { Ok("data".to_string()) }
//! # #[tokio::main]
//! # async fn main() -> Result<(), SourceError> {
//! let config = RetryConfig::default().max_attempts(3);
//! let body = with_retry(config, || fetch_data()).await?;
//! # Ok(())
//! # }
//! ```

mod http;
mod retry;

pub use http::{HttpClient, HttpConfig};
pub use retry::{with_retry, RetryConfig, TransientError};
