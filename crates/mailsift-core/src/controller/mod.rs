//! Session controller.
//!
//! Drives one [`Session`] through its lifecycle:
//!
//! ```text
//! Idle --reset--> Empty --ingest--> Populated --finalize--> Done
//!                   ^                  |  ^                   |
//!                   |                  +--+ ingest            |
//!                   +----------------- reset -----------------+
//! ```
//!
//! Sources are ingested one at a time in the order given. A source that
//! fails, is rejected or is cancelled is reported and the batch moves on;
//! rows ingested before the failure stay in the session.

mod observer;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::classify::Classifier;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::extract::{
    RowStream, Source, SourceId, SourceKind, TabularSource, TextCandidate, TextExtractor,
    TextInput,
};
use crate::session::{Session, Snapshot, SourceFields, Stats};

pub use observer::{IngestObserver, LoggingObserver, NoopObserver};

/// Lifecycle state of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    /// Never reset.
    #[default]
    Idle,
    /// Reset, nothing ingested yet.
    Empty,
    /// At least one source ingested.
    Populated,
    /// Finalized; needs a reset before reuse.
    Done,
}

impl ControllerState {
    /// Convert to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Empty => "empty",
            Self::Populated => "populated",
            Self::Done => "done",
        }
    }

    const fn accepts_work(self) -> bool {
        matches!(self, Self::Empty | Self::Populated)
    }
}

/// A source waiting its turn, with the token that cancels it.
#[derive(Debug)]
pub struct StagedSource {
    /// Identifier reported back in outcomes.
    pub id: SourceId,
    /// What to ingest.
    pub source: Source,
    /// Fires to abandon this source.
    pub cancel: CancellationToken,
}

impl StagedSource {
    /// Stages a source with its own cancellation token.
    #[must_use]
    pub fn new(id: SourceId, source: Source) -> Self {
        Self {
            id,
            source,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses the given cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// How a source ended.
///
/// `summary` counts only this source's rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    /// Source exhausted.
    Complete {
        /// Source ID.
        id: SourceId,
        /// Source name.
        name: String,
        /// Rows examined and where they went.
        summary: Stats,
    },
    /// Source could not be read or parsed to the end.
    Failed {
        /// Source ID.
        id: SourceId,
        /// Source name.
        name: String,
        /// What went wrong.
        error: String,
        /// Rows ingested before the failure.
        summary: Stats,
    },
    /// Source configuration was invalid; nothing was ingested.
    Rejected {
        /// Source ID.
        id: SourceId,
        /// Source name.
        name: String,
        /// Why the source was rejected.
        reason: String,
    },
    /// Source was cancelled.
    Cancelled {
        /// Source ID.
        id: SourceId,
        /// Source name.
        name: String,
        /// Rows ingested before cancellation.
        summary: Stats,
    },
}

impl SourceOutcome {
    /// Source ID.
    #[must_use]
    pub const fn id(&self) -> SourceId {
        match self {
            Self::Complete { id, .. }
            | Self::Failed { id, .. }
            | Self::Rejected { id, .. }
            | Self::Cancelled { id, .. } => *id,
        }
    }

    /// Source name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Complete { name, .. }
            | Self::Failed { name, .. }
            | Self::Rejected { name, .. }
            | Self::Cancelled { name, .. } => name,
        }
    }

    /// Returns true if the source was read to the end.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    /// Counters for this source. Rejected sources have none.
    #[must_use]
    pub const fn summary(&self) -> Option<&Stats> {
        match self {
            Self::Complete { summary, .. }
            | Self::Failed { summary, .. }
            | Self::Cancelled { summary, .. } => Some(summary),
            Self::Rejected { .. } => None,
        }
    }
}

/// Runs sources through a session, one at a time.
#[derive(Debug)]
pub struct Controller {
    session: Session,
    text: TextExtractor,
    chunk_size: usize,
    max_chunks_in_flight: usize,
    state: ControllerState,
}

impl Controller {
    /// Creates an idle controller.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            session: Session::new(Classifier::new(&config.classifier)),
            text: TextExtractor::new(config.report_unmatched_text)?,
            chunk_size: config.chunk_size,
            max_chunks_in_flight: config.max_chunks_in_flight,
            state: ControllerState::Idle,
        })
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ControllerState {
        self.state
    }

    /// The session being accumulated.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Clears the session. Allowed in every state.
    pub fn reset(&mut self) {
        self.session.reset();
        self.state = ControllerState::Empty;
        info!("Session reset");
    }

    /// Ingests one source to completion, failure or cancellation.
    ///
    /// Source-level problems are reported in the returned outcome (and to
    /// the observer), not as errors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] before the first reset or after
    /// finalize.
    pub async fn ingest_source<O>(
        &mut self,
        staged: StagedSource,
        observer: &mut O,
    ) -> Result<SourceOutcome>
    where
        O: IngestObserver + ?Sized,
    {
        self.ensure_accepts_work("ingest")?;

        let StagedSource { id, source, cancel } = staged;
        let Source { name, kind } = source;
        observer.on_source_started(id, &name);
        debug!(source = %id, name = %name, "Ingesting source");

        let before = *self.session.stats();
        self.state = ControllerState::Populated;

        let result = if cancel.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            match kind {
                SourceKind::Tabular(tabular) => {
                    self.ingest_tabular(id, tabular, &cancel, observer).await
                }
                SourceKind::Text(text) => self.ingest_text(id, text, &cancel, observer).await,
            }
        };

        let summary = self.session.stats().since(&before);
        let outcome = match result {
            Ok(()) => SourceOutcome::Complete { id, name, summary },
            Err(Error::Cancelled) => SourceOutcome::Cancelled { id, name, summary },
            Err(e) if e.is_configuration() => SourceOutcome::Rejected {
                id,
                name,
                reason: e.to_string(),
            },
            Err(e) => SourceOutcome::Failed {
                id,
                name,
                error: e.to_string(),
                summary,
            },
        };

        observer.on_source_finished(&outcome);
        Ok(outcome)
    }

    /// Returns the accumulated results and marks the session done.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] before the first reset or after
    /// finalize.
    pub fn finalize(&mut self) -> Result<Snapshot> {
        self.ensure_accepts_work("finalize")?;

        let snapshot = self.session.finalize();
        self.state = ControllerState::Done;
        info!(
            total_rows = snapshot.stats().total_rows,
            valid = snapshot.valid_records().len(),
            duplicates = snapshot.stats().duplicates,
            syntax_errors = snapshot.stats().syntax_errors,
            "Session finalized"
        );
        Ok(snapshot)
    }

    /// Resets, ingests every source in order, then finalizes.
    ///
    /// # Errors
    ///
    /// Only fails if the controller state is corrupted; source problems are
    /// reported through the observer.
    pub async fn run_batch<I, O>(&mut self, sources: I, observer: &mut O) -> Result<Snapshot>
    where
        I: IntoIterator<Item = StagedSource>,
        O: IngestObserver + ?Sized,
    {
        self.reset();
        for staged in sources {
            self.ingest_source(staged, observer).await?;
        }
        self.finalize()
    }

    fn ensure_accepts_work(&self, operation: &str) -> Result<()> {
        if self.state.accepts_work() {
            Ok(())
        } else {
            Err(Error::InvalidState(format!(
                "cannot {operation} while {}; reset first",
                self.state.as_str()
            )))
        }
    }

    async fn ingest_tabular<O>(
        &mut self,
        id: SourceId,
        source: TabularSource,
        cancel: &CancellationToken,
        observer: &mut O,
    ) -> Result<()>
    where
        O: IngestObserver + ?Sized,
    {
        let mut stream = RowStream::spawn(
            source,
            self.chunk_size,
            self.max_chunks_in_flight,
            cancel.clone(),
        );
        let mut rows = 0u64;

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Error::Cancelled),
                next = stream.next_chunk() => next?,
            };
            let Some(chunk) = next else {
                return Ok(());
            };

            rows += u64::try_from(chunk.len()).unwrap_or(u64::MAX);
            for row in chunk {
                self.session.ingest(row.candidate.as_deref(), row.fields);
            }
            debug!(source = %id, rows, "Chunk ingested");
            observer.on_progress(id, rows);
        }
    }

    async fn ingest_text<O>(
        &mut self,
        id: SourceId,
        input: TextInput,
        cancel: &CancellationToken,
        observer: &mut O,
    ) -> Result<()>
    where
        O: IngestObserver + ?Sized,
    {
        let text = match input {
            TextInput::Inline(text) => text,
            TextInput::Path(path) => String::from_utf8(tokio::fs::read(&path).await?)?,
        };

        let every = u64::try_from(self.chunk_size).unwrap_or(u64::MAX);
        let mut rows = 0u64;
        for candidate in self.text.candidates(&text) {
            let (TextCandidate::Match(value) | TextCandidate::Unmatched(value)) = candidate;
            self.session.ingest(Some(value), SourceFields::new());
            rows += 1;

            if rows % every == 0 {
                if cancel.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                observer.on_progress(id, rows);
            }
        }

        if rows % every != 0 {
            observer.on_progress(id, rows);
        }
        Ok(())
    }
}
