//! Run report written at the end of a batch.

use std::io::Write;

use anyhow::Result;
use mailsift_core::{AddressType, Snapshot, SourceOutcome};
use serde::Serialize;
use tracing::info;

use crate::staging::SkippedSource;

/// Everything a run produced.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    /// How each staged source ended, in ingestion order.
    pub sources: &'a [SourceOutcome],
    /// Files that never reached the engine.
    pub skipped: &'a [SkippedSource],
    /// Session result.
    pub result: &'a Snapshot,
}

impl RunReport<'_> {
    /// Writes the report as pretty JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        Ok(())
    }

    /// Logs a one-line summary per source and totals for the run.
    pub fn log_summary(&self) {
        for outcome in self.sources {
            match outcome.summary() {
                Some(stats) => info!(
                    source = %outcome.name(),
                    complete = outcome.is_complete(),
                    rows = stats.total_rows,
                    accepted = stats.accepted(),
                    duplicates = stats.duplicates,
                    invalid = stats.syntax_errors,
                    "Source summary"
                ),
                None => info!(source = %outcome.name(), "Source rejected"),
            }
        }

        let stats = self.result.stats();
        info!(
            rows = stats.total_rows,
            valid = self.result.valid_records().len(),
            personal = self.result.count_of(AddressType::Personal),
            corporate = self.result.count_of(AddressType::Corporate),
            disposable = self.result.disposable_addresses().len(),
            role_based = self.result.role_based_addresses().len(),
            duplicates = stats.duplicates,
            invalid = stats.syntax_errors,
            skipped = self.skipped.len(),
            "Run complete"
        );
    }
}
