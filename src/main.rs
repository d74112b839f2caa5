use anyhow::{Context, Result};
use clap::Parser;
use pubmed_affiliations::affiliations::{AuthorRetention, MatchMode};
use pubmed_affiliations::config::{find_config_file, load_config, Config};
use pubmed_affiliations::export::{self, OutputFormat};
use pubmed_affiliations::models::{ArticleRecord, SearchQuery};
use pubmed_affiliations::pipeline::{self, PipelineOutcome};
use pubmed_affiliations::sources::PubMedSource;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Find PubMed papers with non-academic authors and export them as CSV
#[derive(Parser, Debug)]
#[command(name = "pubmed-affiliations")]
#[command(version = pubmed_affiliations::VERSION)]
#[command(about = "Find PubMed papers with authors from non-academic organizations", long_about = None)]
struct Cli {
    /// PubMed search query (full PubMed query syntax)
    #[arg(long, short, required_unless_present = "show_config")]
    query: Option<String>,

    /// Write results to this CSV file instead of stdout
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    debug: bool,

    /// Maximum number of papers to fetch
    #[arg(long, short)]
    max_results: Option<usize>,

    /// Output format when printing to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Auto)]
    format: OutputFormat,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Match denylist keywords as whole words only
    #[arg(long)]
    word_boundary: bool,

    /// Keep only the last non-academic author of each paper
    #[arg(long)]
    last_author_only: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    show_config: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    fn apply(&self, config: &mut Config) {
        if let Some(max_results) = self.max_results {
            config.pubmed.max_results = max_results;
        }
        if self.word_boundary {
            config.classifier.match_mode = MatchMode::WordBoundary;
        }
        if self.last_author_only {
            config.output.author_retention = AuthorRetention::LastOnly;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("pubmed_affiliations={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration from file if specified or found in default locations
    let config_path = cli.config.clone().or_else(find_config_file);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }
    let mut config = load_config(config_path.as_deref()).context("Failed to load configuration")?;
    cli.apply(&mut config);

    if cli.show_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let classifier = config
        .classifier
        .build()
        .context("Invalid classifier denylist")?;
    let query = SearchQuery::new(cli.query.clone().unwrap_or_default())
        .max_results(config.pubmed.max_results);
    let source = PubMedSource::new(config.pubmed.clone(), &config.http, config.retry)
        .context("Failed to create PubMed client")?;

    tracing::debug!("Searching PubMed for {:?}", query.query);
    let outcome = pipeline::run(
        &source,
        &query,
        &classifier,
        config.output.author_retention,
    )
    .await?;

    let records = match outcome {
        PipelineOutcome::Records(records) => records,
        empty => {
            if let Some(message) = empty.message() {
                println!("{}", message);
            }
            return Ok(());
        }
    };

    match &cli.file {
        Some(path) => match export::write_csv(path, &records) {
            Ok(()) => println!("Data saved to {}", path.display()),
            Err(e) => {
                tracing::error!("Failed to write {}: {}", path.display(), e);
                print_records(&records, cli.format)?;
            }
        },
        None => print_records(&records, cli.format)?,
    }

    Ok(())
}

fn print_records(records: &[ArticleRecord], format: OutputFormat) -> Result<()> {
    println!("{}", export::render(records, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_query_is_required() {
        assert!(Cli::try_parse_from(["pubmed-affiliations"]).is_err());
    }

    #[test]
    fn test_show_config_needs_no_query() {
        let cli = Cli::try_parse_from(["pubmed-affiliations", "--show-config"]).unwrap();
        assert!(cli.show_config);
        assert!(cli.query.is_none());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "pubmed-affiliations",
            "-q",
            "cancer",
            "-m",
            "12",
            "--word-boundary",
            "--last-author-only",
            "--format",
            "plain",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.pubmed.max_results, 12);
        assert_eq!(config.classifier.match_mode, MatchMode::WordBoundary);
        assert_eq!(config.output.author_retention, AuthorRetention::LastOnly);
        assert_eq!(cli.format, OutputFormat::Plain);
        assert!(cli.file.is_none());
        assert_eq!(cli.query.as_deref(), Some("cancer"));
    }

    #[test]
    fn test_defaults_leave_config_untouched() {
        let cli = Cli::try_parse_from(["pubmed-affiliations", "--query", "x", "-f", "out.csv", "-d"]).unwrap();

        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config, Config::default());
        assert!(cli.debug);
        assert_eq!(cli.file, Some(PathBuf::from("out.csv")));
    }
}
