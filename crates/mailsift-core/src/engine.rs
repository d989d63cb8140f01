//! Message-passing engine.
//!
//! The engine is a tokio task that owns one [`Controller`]. Callers never
//! touch session state directly: they send commands through an
//! [`EngineHandle`] and read [`Event`]s from [`EngineEvents`]. Commands are
//! processed strictly in the order sent, one source at a time.
//!
//! # Example
//!
//! ```no_run
//! use mailsift_core::{EngineConfig, Event, Source, spawn_engine};
//!
//! # async fn run() -> mailsift_core::Result<()> {
//! let (mut handle, mut events) = spawn_engine(EngineConfig::default())?;
//!
//! handle.reset()?;
//! handle.ingest(Source::text("note", "ann@example.com, bob@example.org"))?;
//! handle.finalize()?;
//!
//! let snapshot = events
//!     .result(|event| {
//!         if let Event::SourceFinished(outcome) = event {
//!             println!("{} finished", outcome.name());
//!         }
//!     })
//!     .await?;
//! println!("{} unique addresses", snapshot.valid_records().len());
//!
//! handle.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::controller::{
    Controller, IngestObserver, LoggingObserver, SourceOutcome, StagedSource,
};
use crate::error::{Error, Result};
use crate::extract::{Source, SourceId};
use crate::session::Snapshot;

/// Notifications sent by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Session cleared.
    ResetComplete,
    /// Rows examined so far for a source. Dropped if the channel is full.
    Progress {
        /// Source ID.
        id: SourceId,
        /// Cumulative rows for this source.
        rows: u64,
    },
    /// A source finished; see the outcome for how.
    SourceFinished(SourceOutcome),
    /// Snapshot produced by finalize.
    Result(Box<Snapshot>),
    /// A command was refused (e.g. finalize before reset).
    CommandRejected {
        /// Why the command was refused.
        reason: String,
    },
}

#[derive(Debug)]
enum Command {
    Reset,
    Ingest(StagedSource),
    Finalize,
}

/// Handle on a staged source.
#[derive(Debug, Clone)]
pub struct SourceTicket {
    id: SourceId,
    cancel: CancellationToken,
}

impl SourceTicket {
    /// ID reported in this source's events.
    #[must_use]
    pub const fn id(&self) -> SourceId {
        self.id
    }

    /// Abandons the source. Rows already ingested are kept.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// Sending side of the engine.
#[derive(Debug)]
pub struct EngineHandle {
    commands: mpsc::UnboundedSender<Command>,
    generation: CancellationToken,
    next_id: u64,
    task: JoinHandle<()>,
}

impl EngineHandle {
    /// Clears the session.
    ///
    /// Every source staged before this call is cancelled first, so a reset
    /// never waits behind a long ingestion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EngineClosed`] if the engine has stopped.
    pub fn reset(&mut self) -> Result<()> {
        self.generation.cancel();
        self.generation = CancellationToken::new();
        self.send(Command::Reset)
    }

    /// Stages a source behind any already staged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EngineClosed`] if the engine has stopped.
    pub fn ingest(&mut self, source: Source) -> Result<SourceTicket> {
        self.next_id += 1;
        let ticket = SourceTicket {
            id: SourceId::new(self.next_id),
            cancel: self.generation.child_token(),
        };
        let staged = StagedSource::new(ticket.id, source).with_cancel(ticket.cancel.clone());
        self.send(Command::Ingest(staged))?;
        Ok(ticket)
    }

    /// Requests the result snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EngineClosed`] if the engine has stopped.
    pub fn finalize(&self) -> Result<()> {
        self.send(Command::Finalize)
    }

    /// Stops accepting commands and waits for staged work to drain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Task`] if the engine task panicked.
    pub async fn shutdown(self) -> Result<()> {
        let Self { commands, task, .. } = self;
        drop(commands);
        task.await?;
        Ok(())
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| Error::EngineClosed)
    }
}

/// Receiving side of the engine.
#[derive(Debug)]
pub struct EngineEvents {
    rx: mpsc::Receiver<Event>,
}

impl EngineEvents {
    /// Waits for the next event. `None` once the engine has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Passes events to `on_event` until a snapshot arrives.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if finalize was refused, or
    /// [`Error::EngineClosed`] if the engine stopped first.
    pub async fn result<F>(&mut self, mut on_event: F) -> Result<Snapshot>
    where
        F: FnMut(&Event),
    {
        while let Some(event) = self.rx.recv().await {
            match event {
                Event::Result(snapshot) => return Ok(*snapshot),
                Event::CommandRejected { reason } => return Err(Error::InvalidState(reason)),
                other => on_event(&other),
            }
        }
        Err(Error::EngineClosed)
    }
}

/// Starts an engine task on the current tokio runtime.
///
/// The engine stops when the handle is shut down or dropped and staged work
/// has drained, or when the events receiver is dropped.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn spawn_engine(config: EngineConfig) -> Result<(EngineHandle, EngineEvents)> {
    let controller = Controller::new(&config)?;
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::channel(config.event_capacity);

    let task = tokio::spawn(run(controller, command_rx, event_tx));
    info!(
        chunk_size = config.chunk_size,
        max_chunks_in_flight = config.max_chunks_in_flight,
        "Engine started"
    );

    Ok((
        EngineHandle {
            commands: command_tx,
            generation: CancellationToken::new(),
            next_id: 0,
            task,
        },
        EngineEvents { rx: event_rx },
    ))
}

async fn run(
    mut controller: Controller,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::Sender<Event>,
) {
    while let Some(command) = commands.recv().await {
        let event = match command {
            Command::Reset => {
                controller.reset();
                Event::ResetComplete
            }
            Command::Ingest(staged) => {
                let (id, name) = (staged.id, staged.source.name.clone());
                let mut forwarder = ProgressForwarder { events: &events };
                match controller.ingest_source(staged, &mut forwarder).await {
                    Ok(outcome) => Event::SourceFinished(outcome),
                    Err(e) => Event::SourceFinished(SourceOutcome::Rejected {
                        id,
                        name,
                        reason: e.to_string(),
                    }),
                }
            }
            Command::Finalize => match controller.finalize() {
                Ok(snapshot) => Event::Result(Box::new(snapshot)),
                Err(e) => Event::CommandRejected {
                    reason: e.to_string(),
                },
            },
        };

        if events.send(event).await.is_err() {
            debug!("Event receiver dropped");
            break;
        }
    }
    debug!("Engine stopped");
}

struct ProgressForwarder<'a> {
    events: &'a mpsc::Sender<Event>,
}

impl IngestObserver for ProgressForwarder<'_> {
    fn on_source_started(&mut self, id: SourceId, name: &str) {
        LoggingObserver.on_source_started(id, name);
    }

    fn on_progress(&mut self, id: SourceId, rows: u64) {
        let _ = self.events.try_send(Event::Progress { id, rows });
    }

    fn on_source_finished(&mut self, outcome: &SourceOutcome) {
        LoggingObserver.on_source_finished(outcome);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn drain_until_result(events: &mut EngineEvents) -> Vec<Event> {
        let mut seen = Vec::new();
        while let Some(event) = events.next().await {
            let done = matches!(event, Event::Result(_) | Event::CommandRejected { .. });
            seen.push(event);
            if done {
                break;
            }
        }
        seen
    }

    #[tokio::test]
    async fn test_command_order() {
        let (mut handle, mut events) = spawn_engine(EngineConfig::default()).unwrap();
        handle.reset().unwrap();
        let ticket = handle.ingest(Source::text("note", "a@x.com b@x.com")).unwrap();
        handle.finalize().unwrap();

        let seen = drain_until_result(&mut events).await;
        assert_eq!(seen.first(), Some(&Event::ResetComplete));
        assert!(seen.contains(&Event::Progress {
            id: ticket.id(),
            rows: 2
        }));
        assert!(seen.iter().any(|e| matches!(
            e,
            Event::SourceFinished(outcome) if outcome.is_complete() && outcome.id() == ticket.id()
        )));
        match seen.last() {
            Some(Event::Result(snapshot)) => assert_eq!(snapshot.valid_records().len(), 2),
            other => panic!("expected result, got {other:?}"),
        }

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_finalize_before_reset_is_rejected() {
        let (handle, mut events) = spawn_engine(EngineConfig::default()).unwrap();
        handle.finalize().unwrap();

        let err = events.result(|_| {}).await.unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_ingest_before_reset_is_rejected_source() {
        let (mut handle, mut events) = spawn_engine(EngineConfig::default()).unwrap();
        let ticket = handle.ingest(Source::text("early", "a@x.com")).unwrap();

        match events.next().await {
            Some(Event::SourceFinished(SourceOutcome::Rejected { id, .. })) => {
                assert_eq!(id, ticket.id());
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reset_cancels_staged_sources() {
        let (mut handle, mut events) = spawn_engine(EngineConfig::default()).unwrap();
        handle.reset().unwrap();
        let stale = handle.ingest(Source::text("stale", "old@x.com")).unwrap();
        handle.reset().unwrap();
        let fresh = handle.ingest(Source::text("fresh", "new@x.com")).unwrap();
        handle.finalize().unwrap();

        let mut finished = Vec::new();
        let snapshot = events
            .result(|event| {
                if let Event::SourceFinished(outcome) = event {
                    finished.push(outcome.clone());
                }
            })
            .await
            .unwrap();

        assert!(matches!(
            &finished[0],
            SourceOutcome::Cancelled { id, .. } if *id == stale.id()
        ));
        assert!(finished[1].is_complete());
        assert_eq!(finished[1].id(), fresh.id());
        let emails: Vec<&str> = snapshot
            .valid_records()
            .iter()
            .map(|r| r.email.as_str())
            .collect();
        assert_eq!(emails, vec!["new@x.com"]);
    }

    #[tokio::test]
    async fn test_ticket_cancel() {
        let (mut handle, mut events) = spawn_engine(EngineConfig::default()).unwrap();
        handle.reset().unwrap();
        let ticket = handle.ingest(Source::text("note", "a@x.com")).unwrap();
        ticket.cancel();
        handle.finalize().unwrap();

        let mut cancelled = false;
        let snapshot = events
            .result(|event| {
                if let Event::SourceFinished(SourceOutcome::Cancelled { .. }) = event {
                    cancelled = true;
                }
            })
            .await
            .unwrap();
        assert!(cancelled);
        assert!(snapshot.valid_records().is_empty());
    }

    #[tokio::test]
    async fn test_handle_reports_closed_engine() {
        let (mut handle, events) = spawn_engine(EngineConfig::default()).unwrap();
        drop(events);
        handle.reset().unwrap();

        // The engine exits once it fails to deliver the reset event.
        for _ in 0..100 {
            if handle.ingest(Source::text("late", "a@x.com")).is_err() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("engine did not stop after its receiver was dropped");
    }
}
