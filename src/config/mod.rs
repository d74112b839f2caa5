//! Configuration management.
//!
//! Settings are layered with the `config` crate: built-in defaults, then a
//! TOML file, then `PUBMED_AFFILIATIONS_*` environment variables (nested
//! keys separated by `__`, e.g. `PUBMED_AFFILIATIONS_PUBMED__API_KEY`).
//!
//! # Configuration File Format
//!
//! ```toml
//! [pubmed]
//! max_results = 20
//! api_key = "your-ncbi-key"
//! email = "you@example.com"
//!
//! [http]
//! timeout_secs = 30
//! ipv4_only = true
//!
//! [retry]
//! max_attempts = 3
//! initial_delay_ms = 500
//!
//! [classifier]
//! denylist = ["University", "labs", "Institute", "College", "School"]
//! match_mode = "word_boundary"
//!
//! [output]
//! author_retention = "last_only"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::affiliations::{AffiliationClassifier, AuthorRetention, MatchMode, DEFAULT_DENYLIST};
use crate::sources::PubMedConfig;
use crate::utils::{HttpConfig, RetryConfig};

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "PUBMED_AFFILIATIONS";

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "pubmed-affiliations.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// E-utilities endpoints and identification
    pub pubmed: PubMedConfig,

    /// HTTP transport settings
    pub http: HttpConfig,

    /// Retry settings for transient HTTP failures
    pub retry: RetryConfig,

    /// Affiliation classifier settings
    pub classifier: ClassifierConfig,

    /// Record assembly settings
    pub output: OutputConfig,
}

/// Classifier configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Keywords that mark an affiliation as academic
    pub denylist: Vec<String>,

    /// How keywords are matched
    pub match_mode: MatchMode,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            denylist: DEFAULT_DENYLIST.iter().map(|k| k.to_string()).collect(),
            match_mode: MatchMode::default(),
        }
    }
}

impl ClassifierConfig {
    /// Build the classifier these settings describe
    pub fn build(&self) -> Result<AffiliationClassifier, regex::Error> {
        AffiliationClassifier::new(self.denylist.iter().cloned(), self.match_mode)
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Which non-academic authors are kept per article
    pub author_retention: AuthorRetention,
}

impl Config {
    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Load configuration from an optional file plus environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).format(config::FileFormat::Toml));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize()
}

/// Find a configuration file in the working directory or the user config dir
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("config.toml"))
        .filter(|path| path.is_file())
}
