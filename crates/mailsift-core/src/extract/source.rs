//! Source descriptions.

use std::fmt;
use std::io::Read;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::{Error, Result};

/// Identifier assigned to a staged source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SourceId(u64);

impl SourceId {
    /// Creates a new source ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Name of the column holding candidate addresses in a tabular source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnSelector(String);

impl ColumnSelector {
    /// Creates a selector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the name is empty or whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::Config("column selector is empty".to_string()));
        }
        Ok(Self(name))
    }

    /// The column name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if a header names this column. Surrounding whitespace
    /// in either is ignored.
    #[must_use]
    pub fn matches(&self, header: &str) -> bool {
        header.trim() == self.0.trim()
    }
}

impl fmt::Display for ColumnSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where tabular bytes come from.
pub enum TabularInput {
    /// File opened when ingestion starts.
    Path(PathBuf),
    /// Any byte reader.
    Reader(Box<dyn Read + Send>),
}

impl fmt::Debug for TabularInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

/// A delimited-text source with a header row.
#[derive(Debug)]
pub struct TabularSource {
    /// Byte input.
    pub input: TabularInput,
    /// Column holding the candidate address.
    pub column: ColumnSelector,
    /// Field delimiter.
    pub delimiter: u8,
}

/// A free-text source scanned in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInput {
    /// Text already in memory.
    Inline(String),
    /// File read when ingestion starts.
    Path(PathBuf),
}

/// Kind-specific part of a source.
#[derive(Debug)]
pub enum SourceKind {
    /// Rows with a designated address column.
    Tabular(TabularSource),
    /// Unstructured text.
    Text(TextInput),
}

/// One unit of input staged for ingestion.
#[derive(Debug)]
pub struct Source {
    /// Human-readable label (usually a file name).
    pub name: String,
    /// What to read.
    pub kind: SourceKind,
}

impl Source {
    /// A comma-separated file with a header row.
    #[must_use]
    pub fn csv_file(path: impl Into<PathBuf>, column: ColumnSelector) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            kind: SourceKind::Tabular(TabularSource {
                input: TabularInput::Path(path),
                column,
                delimiter: b',',
            }),
        }
    }

    /// Comma-separated data from any reader.
    #[must_use]
    pub fn csv_reader(
        name: impl Into<String>,
        reader: impl Read + Send + 'static,
        column: ColumnSelector,
    ) -> Self {
        Self {
            name: name.into(),
            kind: SourceKind::Tabular(TabularSource {
                input: TabularInput::Reader(Box::new(reader)),
                column,
                delimiter: b',',
            }),
        }
    }

    /// A text blob held in memory.
    #[must_use]
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SourceKind::Text(TextInput::Inline(text.into())),
        }
    }

    /// A text file.
    #[must_use]
    pub fn text_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            kind: SourceKind::Text(TextInput::Path(path)),
        }
    }

    /// Sets the field delimiter of a tabular source. No effect on text.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        if let SourceKind::Tabular(tabular) = &mut self.kind {
            tabular.delimiter = delimiter;
        }
        self
    }

    /// Returns true for tabular sources.
    #[must_use]
    pub const fn is_tabular(&self) -> bool {
        matches!(self.kind, SourceKind::Tabular(_))
    }
}
