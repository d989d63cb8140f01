//! Callbacks fired while a controller works through sources.
//!
//! # Example
//!
//! ```
//! use mailsift_core::SourceId;
//! use mailsift_core::controller::{IngestObserver, SourceOutcome};
//!
//! struct Tally {
//!     failed: usize,
//! }
//!
//! impl IngestObserver for Tally {
//!     fn on_source_finished(&mut self, outcome: &SourceOutcome) {
//!         if !outcome.is_complete() {
//!             self.failed += 1;
//!         }
//!     }
//! }
//!
//! let mut tally = Tally { failed: 0 };
//! tally.on_source_finished(&SourceOutcome::Rejected {
//!     id: SourceId::new(1),
//!     name: "contacts.csv".to_string(),
//!     reason: "column `Email` not found in header row".to_string(),
//! });
//! assert_eq!(tally.failed, 1);
//! ```

use super::SourceOutcome;
use crate::extract::SourceId;

/// Receives progress and per-source outcomes.
///
/// Every method has an empty default; implement the ones you need.
pub trait IngestObserver: Send {
    /// Called when a source starts.
    fn on_source_started(&mut self, id: SourceId, name: &str) {
        let _ = (id, name);
    }

    /// Called after each chunk with the rows examined so far for the source.
    fn on_progress(&mut self, id: SourceId, rows: u64) {
        let _ = (id, rows);
    }

    /// Called once per source when it completes, fails, is rejected or is
    /// cancelled.
    fn on_source_finished(&mut self, outcome: &SourceOutcome) {
        let _ = outcome;
    }
}

/// An observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl IngestObserver for NoopObserver {}

/// An observer that logs using tracing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl IngestObserver for LoggingObserver {
    fn on_source_started(&mut self, id: SourceId, name: &str) {
        tracing::info!(source = %id, name, "Source started");
    }

    fn on_progress(&mut self, id: SourceId, rows: u64) {
        tracing::debug!(source = %id, rows, "Progress");
    }

    fn on_source_finished(&mut self, outcome: &SourceOutcome) {
        match outcome {
            SourceOutcome::Complete { id, summary, .. } => tracing::info!(
                source = %id,
                rows = summary.total_rows,
                duplicates = summary.duplicates,
                syntax_errors = summary.syntax_errors,
                "Source complete"
            ),
            SourceOutcome::Failed { id, error, .. } => {
                tracing::warn!(source = %id, error, "Source failed");
            }
            SourceOutcome::Rejected { id, reason, .. } => {
                tracing::warn!(source = %id, reason, "Source rejected");
            }
            SourceOutcome::Cancelled { id, summary, .. } => {
                tracing::warn!(source = %id, rows = summary.total_rows, "Source cancelled");
            }
        }
    }
}
