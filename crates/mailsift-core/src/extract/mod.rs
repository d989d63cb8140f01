//! Candidate extraction.
//!
//! Two strategies turn a [`Source`] into candidate strings:
//! - **Tabular**: delimited text with a header row; the value of one
//!   designated column per row, streamed in chunks ([`RowStream`])
//! - **Text**: free text scanned for address-shaped substrings
//!   ([`TextExtractor`])
//!
//! Candidates are raw; normalization happens in the session.

mod source;
mod tabular;
mod text;

pub use source::{
    ColumnSelector, Source, SourceId, SourceKind, TabularInput, TabularSource, TextInput,
};
pub use tabular::{RowChunk, RowStream, TabularRow};
pub use text::{ADDRESS_PATTERN, TextCandidate, TextExtractor};
