//! CSV export of a result subset.

use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use mailsift_core::{AddressType, ClassifiedRecord, Snapshot};

/// Columns appended after the passthrough fields.
const DERIVED_COLUMNS: [&str; 6] = ["email", "domain", "tld", "type", "disposable", "role_based"];

/// Which records to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFilter {
    /// Every valid record.
    All,
    /// Personal-provider addresses.
    Personal,
    /// Everything not on a personal provider.
    Corporate,
    /// Disposable-mailbox addresses.
    Disposable,
    /// Role mailboxes such as `info@` or `support@`.
    RoleBased,
    /// Values that failed validation.
    Invalid,
}

impl ExportFilter {
    fn keep(self, record: &ClassifiedRecord) -> bool {
        match self {
            Self::All => true,
            Self::Personal => record.kind == AddressType::Personal,
            Self::Corporate => record.kind == AddressType::Corporate,
            Self::Disposable => record.is_disposable,
            Self::RoleBased => record.is_role_based,
            Self::Invalid => false,
        }
    }
}

/// Writes the selected subset as CSV and returns the number of data rows.
///
/// Source columns come first, in the order they were first seen across the
/// selected records, followed by the derived columns. A source column that
/// shares a name with a derived column is dropped.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_csv<W: Write>(snapshot: &Snapshot, filter: ExportFilter, writer: W) -> Result<usize> {
    let mut out = csv::Writer::from_writer(writer);

    if filter == ExportFilter::Invalid {
        out.write_record(["value"])?;
        for value in snapshot.invalid_addresses() {
            out.write_record([value])?;
        }
        out.flush()?;
        return Ok(snapshot.invalid_addresses().len());
    }

    let records: Vec<&ClassifiedRecord> = snapshot
        .valid_records()
        .iter()
        .filter(|record| filter.keep(record))
        .collect();

    let mut passthrough: Vec<&str> = Vec::new();
    for record in &records {
        for (key, _) in record.source_fields.iter() {
            if !DERIVED_COLUMNS.contains(&key) && !passthrough.contains(&key) {
                passthrough.push(key);
            }
        }
    }

    out.write_record(passthrough.iter().copied().chain(DERIVED_COLUMNS))?;
    for record in &records {
        let mut row: Vec<&str> = passthrough
            .iter()
            .map(|key| record.source_fields.get(key).unwrap_or_default())
            .collect();
        row.extend([
            record.email.as_str(),
            record.domain.as_str(),
            record.tld.as_str(),
            record.kind.as_str(),
            flag(record.is_disposable),
            flag(record.is_role_based),
        ]);
        out.write_record(&row)?;
    }

    out.flush()?;
    Ok(records.len())
}

const fn flag(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mailsift_core::{Session, SourceFields};

    fn fields(pairs: &[(&str, &str)]) -> SourceFields {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn sample() -> Snapshot {
        let mut session = Session::default();
        session.ingest(
            Some("Ann@Corp.com"),
            fields(&[("Name", "Ann"), ("email", "Ann@Corp.com")]),
        );
        session.ingest(Some("bob@gmail.com"), fields(&[("Team", "Ops")]));
        session.ingest(Some("info@mailinator.com"), SourceFields::default());
        session.ingest(Some("nope"), SourceFields::default());
        session.finalize()
    }

    fn export(filter: ExportFilter) -> (usize, String) {
        let mut buf = Vec::new();
        let rows = write_csv(&sample(), filter, &mut buf).unwrap();
        (rows, String::from_utf8(buf).unwrap())
    }

    #[test]
    fn test_export_all_puts_passthrough_first() {
        let (rows, text) = export(ExportFilter::All);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(rows, 3);
        assert_eq!(lines[0], "Name,Team,email,domain,tld,type,disposable,role_based");
        assert_eq!(lines[1], "Ann,,ann@corp.com,corp.com,com,corporate,false,false");
        assert_eq!(lines[2], ",Ops,bob@gmail.com,gmail.com,com,personal,false,false");
    }

    #[test]
    fn test_export_subsets() {
        let (rows, text) = export(ExportFilter::Personal);
        assert_eq!(rows, 1);
        assert!(text.contains("bob@gmail.com"));

        let (rows, text) = export(ExportFilter::RoleBased);
        assert_eq!(rows, 1);
        assert!(text.lines().nth(1).unwrap().starts_with("info@mailinator.com"));

        let (rows, _) = export(ExportFilter::Disposable);
        assert_eq!(rows, 1);

        let (rows, _) = export(ExportFilter::Corporate);
        assert_eq!(rows, 2);
    }

    #[test]
    fn test_export_invalid() {
        let (rows, text) = export(ExportFilter::Invalid);
        assert_eq!(rows, 1);
        assert_eq!(text, "value\nnope\n");
    }
}
