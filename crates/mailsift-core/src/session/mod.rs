//! Session accumulator.
//!
//! A [`Session`] owns everything accumulated between two resets:
//! - the set of accepted addresses used for deduplication
//! - valid records in first-seen order, plus disposable and role-based
//!   views into them
//! - distinct malformed values
//! - running counters
//!
//! Every candidate lands in exactly one bucket, so the counters always
//! satisfy `total_rows == duplicates + syntax_errors + valid_records.len()`.
//!
//! # Example
//!
//! ```
//! use mailsift_core::session::{IngestOutcome, Session, SourceFields};
//!
//! let mut session = Session::default();
//! session.ingest(Some("Ann@Example.com"), SourceFields::new());
//! let outcome = session.ingest(Some(" ann@example.com "), SourceFields::new());
//! assert_eq!(outcome, IngestOutcome::Duplicate);
//!
//! let snapshot = session.finalize();
//! assert_eq!(snapshot.valid_records().len(), 1);
//! assert_eq!(snapshot.stats().duplicates, 1);
//! ```

mod model;
mod snapshot;
mod validation;

use std::collections::HashSet;

use tracing::trace;

use crate::classify::{Classifier, split_address};

pub use model::{ClassifiedRecord, IngestOutcome, SourceFields, Stats};
pub use snapshot::Snapshot;
pub use validation::is_valid_address;

/// Accumulated state for one session.
#[derive(Debug, Clone)]
pub struct Session {
    classifier: Classifier,
    seen: HashSet<String>,
    invalid_seen: HashSet<String>,
    valid_records: Vec<ClassifiedRecord>,
    disposable: Vec<usize>,
    role_based: Vec<usize>,
    invalid_addresses: Vec<String>,
    stats: Stats,
}

impl Session {
    /// Creates an empty session using the given classifier.
    #[must_use]
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            seen: HashSet::new(),
            invalid_seen: HashSet::new(),
            valid_records: Vec::new(),
            disposable: Vec::new(),
            role_based: Vec::new(),
            invalid_addresses: Vec::new(),
            stats: Stats::default(),
        }
    }

    /// Clears all accumulated state. The classifier is kept.
    pub fn reset(&mut self) {
        self.seen.clear();
        self.invalid_seen.clear();
        self.valid_records.clear();
        self.disposable.clear();
        self.role_based.clear();
        self.invalid_addresses.clear();
        self.stats = Stats::default();
    }

    /// Ingests one candidate.
    ///
    /// `None`, empty and whitespace-only candidates count as syntax errors
    /// without being listed. Otherwise the candidate is normalized, checked
    /// against accepted addresses, then validated. Only valid addresses join
    /// the dedup set, so a malformed value seen twice is counted twice.
    pub fn ingest(&mut self, candidate: Option<&str>, fields: SourceFields) -> IngestOutcome {
        self.stats.total_rows += 1;

        let Some(normalized) = candidate.map(normalize).filter(|c| !c.is_empty()) else {
            self.stats.syntax_errors += 1;
            trace!("missing value");
            return IngestOutcome::Missing;
        };

        if self.seen.contains(&normalized) {
            self.stats.duplicates += 1;
            trace!(address = %normalized, "duplicate");
            return IngestOutcome::Duplicate;
        }

        if !is_valid_address(&normalized) {
            self.reject(normalized);
            return IngestOutcome::Invalid;
        }

        let index = self.accept(normalized, fields);
        IngestOutcome::Accepted(index)
    }

    /// Returns a copy of the current results.
    #[must_use]
    pub fn finalize(&self) -> Snapshot {
        Snapshot {
            valid_records: self.valid_records.clone(),
            disposable: self.disposable.clone(),
            role_based: self.role_based.clone(),
            invalid_addresses: self.invalid_addresses.clone(),
            stats: self.stats,
        }
    }

    /// Current counters.
    #[must_use]
    pub const fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Number of distinct valid addresses accepted so far.
    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.valid_records.len()
    }

    /// Returns true if the address (in any case or padding) was accepted.
    #[must_use]
    pub fn contains(&self, address: &str) -> bool {
        self.seen.contains(&normalize(address))
    }

    fn reject(&mut self, normalized: String) {
        self.stats.syntax_errors += 1;
        trace!(value = %normalized, "invalid syntax");
        if self.invalid_seen.insert(normalized.clone()) {
            self.invalid_addresses.push(normalized);
        }
    }

    fn accept(&mut self, email: String, source_fields: SourceFields) -> usize {
        self.seen.insert(email.clone());

        let (_, domain) = split_address(&email);
        let domain = domain.to_string();
        let flags = self.classifier.classify_address(&email);
        let domain_info = self.classifier.classify_domain(&domain);

        let index = self.valid_records.len();
        if flags.is_disposable {
            self.disposable.push(index);
        }
        if flags.is_role_based {
            self.role_based.push(index);
        }

        trace!(address = %email, index, "accepted");
        self.valid_records.push(ClassifiedRecord {
            email,
            domain,
            tld: domain_info.tld,
            kind: domain_info.kind,
            is_disposable: flags.is_disposable,
            is_role_based: flags.is_role_based,
            source_fields,
        });
        index
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Classifier::default())
    }
}

/// Trims and lower-cases a candidate.
#[must_use]
pub fn normalize(candidate: &str) -> String {
    candidate.trim().to_lowercase()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_possible_truncation)]
mod tests {
    use super::*;
    use crate::classify::AddressType;
    use proptest::prelude::*;

    fn row(email: &str) -> SourceFields {
        [("Email", email)].into_iter().collect()
    }

    fn assert_balanced(session: &Session) {
        let stats = session.stats();
        assert_eq!(
            stats.total_rows,
            stats.duplicates + stats.syntax_errors + session.valid_count() as u64
        );
    }

    #[test]
    fn test_tabular_scenario() {
        let mut session = Session::default();
        for value in ["a@corp.com", "", "not-an-email", "b@gmail.com"] {
            let candidate = Some(value).filter(|v| !v.is_empty());
            session.ingest(candidate, row(value));
        }

        let snapshot = session.finalize();
        assert_eq!(snapshot.valid_records().len(), 2);
        assert_eq!(snapshot.invalid_addresses(), ["not-an-email"]);
        assert_eq!(snapshot.stats().syntax_errors, 2);
        assert_eq!(snapshot.stats().duplicates, 0);
        assert_eq!(snapshot.stats().total_rows, 4);
        assert_balanced(&session);
    }

    #[test]
    fn test_duplicate_in_any_case_or_padding() {
        let mut session = Session::default();
        assert!(session.ingest(Some("a@x.com"), SourceFields::new()).is_accepted());
        assert_eq!(
            session.ingest(Some("  A@X.COM\t"), SourceFields::new()),
            IngestOutcome::Duplicate
        );

        let snapshot = session.finalize();
        assert_eq!(snapshot.valid_records().len(), 1);
        assert_eq!(snapshot.stats().duplicates, 1);
    }

    #[test]
    fn test_missing_values_are_not_listed() {
        let mut session = Session::default();
        assert_eq!(session.ingest(None, SourceFields::new()), IngestOutcome::Missing);
        assert_eq!(
            session.ingest(Some("   "), SourceFields::new()),
            IngestOutcome::Missing
        );

        let snapshot = session.finalize();
        assert!(snapshot.invalid_addresses().is_empty());
        assert_eq!(snapshot.stats().syntax_errors, 2);
    }

    #[test]
    fn test_repeated_invalid_counted_but_listed_once() {
        let mut session = Session::default();
        session.ingest(Some("broken@"), SourceFields::new());
        session.ingest(Some("BROKEN@"), SourceFields::new());

        let snapshot = session.finalize();
        assert_eq!(snapshot.invalid_addresses(), ["broken@"]);
        assert_eq!(snapshot.stats().syntax_errors, 2);
        assert_eq!(snapshot.stats().duplicates, 0);
        assert_balanced(&session);
    }

    #[test]
    fn test_record_carries_classification_and_fields() {
        let mut session = Session::default();
        let mut fields = SourceFields::new();
        fields.push("Name", "Help Desk");
        fields.push("Email", "Support@Mailinator.com");

        let outcome = session.ingest(Some("Support@Mailinator.com"), fields);
        assert_eq!(outcome, IngestOutcome::Accepted(0));

        let snapshot = session.finalize();
        let record = &snapshot.valid_records()[0];
        assert_eq!(record.email, "support@mailinator.com");
        assert_eq!(record.domain, "mailinator.com");
        assert_eq!(record.tld, "com");
        assert_eq!(record.kind, AddressType::Corporate);
        assert!(record.is_disposable);
        assert!(record.is_role_based);
        assert_eq!(record.source_fields.get("Name"), Some("Help Desk"));
        assert_eq!(snapshot.disposable_addresses(), vec!["support@mailinator.com"]);
        assert_eq!(snapshot.role_based_addresses(), vec!["support@mailinator.com"]);
    }

    #[test]
    fn test_first_seen_order() {
        let mut session = Session::default();
        for address in ["zed@b.com", "amy@b.com", "mid@b.com", "AMY@b.com"] {
            session.ingest(Some(address), SourceFields::new());
        }

        let result = session.finalize();
        let emails: Vec<&str> = result
            .valid_records()
            .iter()
            .map(|r| r.email.as_str())
            .collect();
        assert_eq!(emails, vec!["zed@b.com", "amy@b.com", "mid@b.com"]);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut session = Session::default();
        session.ingest(Some("a@x.com"), SourceFields::new());
        session.ingest(Some("bad"), SourceFields::new());

        session.reset();
        let once = session.finalize();
        session.reset();
        let twice = session.finalize();

        assert_eq!(once, twice);
        assert!(once.is_empty());
        assert!(!session.contains("a@x.com"));
    }

    #[test]
    fn test_syntax_checked_after_dedup() {
        let mut session = Session::default();
        assert!(session.ingest(Some("x@corp.c0m"), SourceFields::new()).is_accepted());
        assert_eq!(
            session.ingest(Some("X@corp.c0m"), SourceFields::new()),
            IngestOutcome::Duplicate
        );
        assert_eq!(
            session.ingest(Some("user@localhost"), SourceFields::new()),
            IngestOutcome::Invalid
        );

        let snapshot = session.finalize();
        assert_eq!(snapshot.invalid_addresses(), ["user@localhost"]);
        assert_eq!(snapshot.stats().duplicates, 1);
        assert_balanced(&session);
    }

    #[test]
    fn test_finalize_does_not_mutate() {
        let mut session = Session::default();
        session.ingest(Some("a@x.com"), SourceFields::new());
        let first = session.finalize();
        let second = session.finalize();
        assert_eq!(first, second);
        assert_eq!(session.valid_count(), 1);
    }

    proptest! {
        #[test]
        fn prop_counters_balance(
            candidates in proptest::collection::vec(
                proptest::option::of("( )?[a-cA-C]{0,2}(@)?[a-c]{0,2}(\\.)?(com)?( )?"),
                0..60,
            )
        ) {
            let mut session = Session::default();
            for candidate in &candidates {
                session.ingest(candidate.as_deref(), SourceFields::new());
            }

            let snapshot = session.finalize();
            let stats = snapshot.stats();
            prop_assert_eq!(stats.total_rows, candidates.len() as u64);
            prop_assert_eq!(
                stats.total_rows,
                stats.duplicates + stats.syntax_errors + snapshot.valid_records().len() as u64
            );

            let unique: HashSet<&str> =
                snapshot.valid_records().iter().map(|r| r.email.as_str()).collect();
            prop_assert_eq!(unique.len(), snapshot.valid_records().len());
            let unique_invalid: HashSet<&String> = snapshot.invalid_addresses().iter().collect();
            prop_assert_eq!(unique_invalid.len(), snapshot.invalid_addresses().len());
        }
    }
}
