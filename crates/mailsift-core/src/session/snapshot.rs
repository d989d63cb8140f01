//! Immutable view of a session handed to the caller on finalize.

use serde::{Serialize, Serializer};

use super::model::{ClassifiedRecord, Stats};
use crate::classify::AddressType;

/// Point-in-time copy of a session's results.
///
/// Disposable and role-based entries are indices into the valid records,
/// so each address is stored once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub(crate) valid_records: Vec<ClassifiedRecord>,
    pub(crate) disposable: Vec<usize>,
    pub(crate) role_based: Vec<usize>,
    pub(crate) invalid_addresses: Vec<String>,
    pub(crate) stats: Stats,
}

impl Snapshot {
    /// Valid records in first-seen order.
    #[must_use]
    pub fn valid_records(&self) -> &[ClassifiedRecord] {
        &self.valid_records
    }

    /// Records flagged as disposable, in first-seen order.
    pub fn disposable_records(&self) -> impl Iterator<Item = &ClassifiedRecord> {
        self.disposable
            .iter()
            .filter_map(|&index| self.valid_records.get(index))
    }

    /// Records flagged as role-based, in first-seen order.
    pub fn role_based_records(&self) -> impl Iterator<Item = &ClassifiedRecord> {
        self.role_based
            .iter()
            .filter_map(|&index| self.valid_records.get(index))
    }

    /// Disposable addresses, in first-seen order.
    #[must_use]
    pub fn disposable_addresses(&self) -> Vec<&str> {
        self.disposable_records().map(|r| r.email.as_str()).collect()
    }

    /// Role-based addresses, in first-seen order.
    #[must_use]
    pub fn role_based_addresses(&self) -> Vec<&str> {
        self.role_based_records().map(|r| r.email.as_str()).collect()
    }

    /// Distinct values that failed syntax validation.
    #[must_use]
    pub fn invalid_addresses(&self) -> &[String] {
        &self.invalid_addresses
    }

    /// Session counters.
    #[must_use]
    pub const fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Number of valid records of the given type.
    #[must_use]
    pub fn count_of(&self, kind: AddressType) -> usize {
        self.valid_records.iter().filter(|r| r.kind == kind).count()
    }

    /// Returns true if nothing was examined.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.stats.total_rows == 0
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotView<'a> {
    valid_records: &'a [ClassifiedRecord],
    disposable_addresses: Vec<&'a str>,
    role_based_addresses: Vec<&'a str>,
    invalid_addresses: &'a [String],
    stats: &'a Stats,
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SnapshotView {
            valid_records: &self.valid_records,
            disposable_addresses: self.disposable_addresses(),
            role_based_addresses: self.role_based_addresses(),
            invalid_addresses: &self.invalid_addresses,
            stats: &self.stats,
        }
        .serialize(serializer)
    }
}
