//! # mailsift-core
//!
//! Streaming engine that pulls email addresses out of tabular and free-text
//! sources, deduplicates them across a whole session and classifies each one.
//!
//! This crate provides:
//! - **Classification** - disposable, role-based and personal/corporate checks
//!   driven by replaceable lists
//! - **Extraction** - chunked CSV streaming and pattern scanning of text
//! - **Session accumulation** - dedup set, ordered results and counters
//! - **Session control** - reset, ingest sources in order, finalize
//! - **Engine** - a tokio task driven over channels
//!
//! Nothing is persisted and nothing leaves the process.
//!
//! ## Example
//!
//! ```
//! use mailsift_core::{Controller, EngineConfig, NoopObserver, Source, SourceId, StagedSource};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> mailsift_core::Result<()> {
//! let mut controller = Controller::new(&EngineConfig::default())?;
//! let sources = vec![StagedSource::new(
//!     SourceId::new(1),
//!     Source::text("note", "john@doe.com, jane@AGENCY.net, john@doe.com"),
//! )];
//!
//! let snapshot = controller.run_batch(sources, &mut NoopObserver).await?;
//! assert_eq!(snapshot.valid_records().len(), 2);
//! assert_eq!(snapshot.stats().duplicates, 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod classify;
pub mod config;
pub mod controller;
pub mod engine;
mod error;
pub mod extract;
pub mod session;

pub use classify::{AddressFlags, AddressType, Classifier, ClassifierConfig, DomainInfo};
pub use config::{EngineConfig, EngineConfigBuilder};
pub use controller::{
    Controller, ControllerState, IngestObserver, LoggingObserver, NoopObserver, SourceOutcome,
    StagedSource,
};
pub use engine::{EngineEvents, EngineHandle, Event, SourceTicket, spawn_engine};
pub use error::{Error, Result};
pub use extract::{ColumnSelector, Source, SourceId, SourceKind, TextExtractor};
pub use session::{ClassifiedRecord, IngestOutcome, Session, Snapshot, SourceFields, Stats};
