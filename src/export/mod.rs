//! CSV export and terminal rendering of article records.

use comfy_table::{Attribute, Cell, Table};
use csv::{QuoteStyle, WriterBuilder};
use std::io::{self, IsTerminal};
use std::path::Path;

use crate::models::ArticleRecord;

/// CSV column names, in output order
pub const HEADERS: [&str; 6] = [
    "ID",
    "Date",
    "Title",
    "Non-academic Author(s)",
    "Company Affiliation(s)",
    "Author Email",
];

/// Errors that can occur while exporting records
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// How records are rendered on stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Table on a terminal, JSON otherwise
    #[default]
    Auto,
    Table,
    Json,
    Plain,
}

impl OutputFormat {
    /// Replace `Auto` with the concrete format for the given terminal state
    pub fn resolve(self, is_tty: bool) -> Self {
        match self {
            OutputFormat::Auto if is_tty => OutputFormat::Table,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

fn row(record: &ArticleRecord) -> [String; 6] {
    [
        record.id.clone(),
        record.revision_date.to_string(),
        record.title.clone(),
        record.author_names(),
        record.affiliations(),
        record.emails(),
    ]
}

fn write_records<W: io::Write>(writer: W, records: &[ArticleRecord]) -> Result<W, ExportError> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);

    wtr.write_record(HEADERS)?;
    for record in records {
        wtr.write_record(row(record))?;
    }
    wtr.flush()?;

    wtr.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

/// Write records to a CSV file, replacing any existing file
pub fn write_csv(path: &Path, records: &[ArticleRecord]) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_records(file, records)?;
    tracing::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Render records as CSV text
pub fn to_csv_string(records: &[ArticleRecord]) -> Result<String, ExportError> {
    let bytes = write_records(Vec::new(), records)?;
    Ok(String::from_utf8(bytes)?)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Render records for stdout. `Auto` picks by whether stdout is a terminal.
pub fn render(records: &[ArticleRecord], format: OutputFormat) -> Result<String, ExportError> {
    match format.resolve(io::stdout().is_terminal()) {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Plain => Ok(records
            .iter()
            .map(|record| row(record).join(" | "))
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Table | OutputFormat::Auto => {
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(HEADERS.to_vec());

            for record in records {
                let [id, date, title, authors, affiliations, emails] = row(record);
                table.add_row(vec![
                    Cell::new(id),
                    Cell::new(date),
                    Cell::new(truncate(&title, 50)).add_attribute(Attribute::Bold),
                    Cell::new(authors),
                    Cell::new(truncate(&affiliations, 60)),
                    Cell::new(emails),
                ]);
            }
            Ok(table.to_string())
        }
    }
}
