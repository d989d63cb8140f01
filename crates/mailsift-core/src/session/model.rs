//! Session data models.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::classify::AddressType;

/// Passthrough fields copied from the row an address came from.
///
/// Keeps the column order of the source. Empty for text sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFields(Vec<(String, String)>);

impl SourceFields {
    /// Creates an empty field table.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a field.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Returns the value of the first field named `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over `(key, value)` pairs in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SourceFields {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Serialize for SourceFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// One unique, syntactically valid address with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedRecord {
    /// Normalized (trimmed, lower-cased) address.
    pub email: String,
    /// Text after `@`.
    pub domain: String,
    /// Text after the last `.` of the domain.
    pub tld: String,
    /// Personal or corporate.
    #[serde(rename = "type")]
    pub kind: AddressType,
    /// Domain is a disposable-mailbox provider.
    pub is_disposable: bool,
    /// Local part is a role prefix.
    pub is_role_based: bool,
    /// Fields copied from the originating row.
    pub source_fields: SourceFields,
}

/// Running counters for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Every row or candidate examined.
    pub total_rows: u64,
    /// Candidates whose address was already accepted this session.
    pub duplicates: u64,
    /// Missing values and malformed candidates.
    pub syntax_errors: u64,
}

impl Stats {
    /// Candidates accepted as new valid addresses.
    #[must_use]
    pub const fn accepted(&self) -> u64 {
        self.total_rows
            .saturating_sub(self.duplicates)
            .saturating_sub(self.syntax_errors)
    }

    /// Counter movement between an earlier reading and this one.
    #[must_use]
    pub const fn since(&self, earlier: &Self) -> Self {
        Self {
            total_rows: self.total_rows.saturating_sub(earlier.total_rows),
            duplicates: self.duplicates.saturating_sub(earlier.duplicates),
            syntax_errors: self.syntax_errors.saturating_sub(earlier.syntax_errors),
        }
    }
}

/// What happened to a single candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// New valid address, stored at this index of the valid records.
    Accepted(usize),
    /// Address already accepted earlier in the session.
    Duplicate,
    /// No value where one was expected.
    Missing,
    /// Value failed address syntax validation.
    Invalid,
}

impl IngestOutcome {
    /// Returns true if the candidate produced a new record.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}
