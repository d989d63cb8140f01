//! Turning file paths into engine sources.

use std::path::Path;

use anyhow::{Context, Result, bail};
use mailsift_core::{ColumnSelector, Source};
use serde::Serialize;

/// Header fragments that suggest an address column.
const COLUMN_HINTS: &[&str] = &["email", "mail", "address"];

/// A file that was not handed to the engine.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedSource {
    /// Path as given on the command line.
    pub path: String,
    /// Why it was skipped.
    pub reason: String,
}

/// How a file will be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Delimited with a header row.
    Tabular(u8),
    /// Free text.
    Text,
}

impl FileKind {
    /// Picks a kind from the file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match extension.as_deref() {
            Some("csv") => Self::Tabular(b','),
            Some("tsv" | "tab") => Self::Tabular(b'\t'),
            _ => Self::Text,
        }
    }
}

/// Returns the first header whose name contains an address hint.
#[must_use]
pub fn detect_email_column<'a, I>(headers: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    headers.into_iter().find(|header| {
        let lower = header.to_lowercase();
        COLUMN_HINTS.iter().any(|hint| lower.contains(hint))
    })
}

/// Reads only the header row of a delimited file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or its first row parsed.
pub fn read_headers(path: &Path, delimiter: u8) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("reading header row of {}", path.display()))?;
    Ok(headers.iter().map(ToString::to_string).collect())
}

/// Builds a source for `path`.
///
/// Tabular files use `column` when given, otherwise the detected column.
///
/// # Errors
///
/// Returns an error if a tabular file has no usable address column.
pub fn stage(path: &Path, column: Option<&str>) -> Result<Source> {
    match FileKind::from_path(path) {
        FileKind::Text => Ok(Source::text_file(path)),
        FileKind::Tabular(delimiter) => {
            let name = if let Some(column) = column {
                column.to_string()
            } else {
                let headers = read_headers(path, delimiter)?;
                let Some(found) = detect_email_column(headers.iter().map(String::as_str)) else {
                    bail!("no email-like column in header row; pass --column");
                };
                found.to_string()
            };

            tracing::debug!(path = %path.display(), column = %name, "Staging tabular source");
            let selector = ColumnSelector::new(name)?;
            Ok(Source::csv_file(path, selector).with_delimiter(delimiter))
        }
    }
}
