//! Streaming extraction from delimited text with a header row.
//!
//! Parsing runs on a blocking thread and hands rows over in fixed-size
//! chunks through a bounded channel. At most `max_in_flight` chunks are
//! queued plus the one being parsed and the one being ingested, so memory
//! stays flat however large the source is.

use std::fs::File;
use std::io::Read;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::source::{ColumnSelector, TabularInput, TabularSource};
use crate::error::{Error, Result};
use crate::session::SourceFields;

/// One parsed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularRow {
    /// Value of the selected column; `None` when absent or empty.
    pub candidate: Option<String>,
    /// Every `header -> value` pair of the row, in column order.
    pub fields: SourceFields,
}

/// Batch of rows handed over by the parser.
pub type RowChunk = Vec<TabularRow>;

/// Async side of a streaming tabular parse.
#[derive(Debug)]
pub struct RowStream {
    rx: mpsc::Receiver<Result<RowChunk>>,
    task: Option<JoinHandle<()>>,
}

impl RowStream {
    /// Starts parsing `source` on a blocking thread.
    ///
    /// The parser stops early when `cancel` fires or the stream is dropped.
    #[must_use]
    pub fn spawn(
        source: TabularSource,
        chunk_size: usize,
        max_in_flight: usize,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, rx) = mpsc::channel(max_in_flight.max(1));
        let chunk_size = chunk_size.max(1);

        let task = tokio::task::spawn_blocking(move || {
            let TabularSource {
                input,
                column,
                delimiter,
            } = source;

            let reader: Box<dyn Read + Send> = match input {
                TabularInput::Path(path) => match File::open(&path) {
                    Ok(file) => Box::new(file),
                    Err(e) => {
                        let _ = tx.blocking_send(Err(e.into()));
                        return;
                    }
                },
                TabularInput::Reader(reader) => reader,
            };

            if let Err(e) = parse_rows(reader, &column, delimiter, chunk_size, &tx, &cancel) {
                let _ = tx.blocking_send(Err(e));
            }
        });

        Self {
            rx,
            task: Some(task),
        }
    }

    /// Waits for the next chunk.
    ///
    /// Returns `Ok(None)` once the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the parser's error (unreadable input, unknown column,
    /// malformed record), or [`Error::Task`] if the parser thread died.
    pub async fn next_chunk(&mut self) -> Result<Option<RowChunk>> {
        if let Some(chunk) = self.rx.recv().await {
            return chunk.map(Some);
        }

        if let Some(task) = self.task.take() {
            task.await?;
        }
        Ok(None)
    }
}

/// Parses rows and sends them in chunks. Returns early without error if the
/// receiver is gone or `cancel` fires. On a read error the partial chunk is
/// sent before the error is returned.
fn parse_rows(
    reader: Box<dyn Read + Send>,
    column: &ColumnSelector,
    delimiter: u8,
    chunk_size: usize,
    tx: &mpsc::Sender<Result<RowChunk>>,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let index = headers
        .iter()
        .position(|header| column.matches(header))
        .ok_or_else(|| Error::Config(format!("column `{column}` not found in header row")))?;

    let mut chunk = Vec::with_capacity(chunk_size);
    let mut record = csv::StringRecord::new();

    loop {
        match reader.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                // Rows parsed before the bad record still belong to the session.
                if !chunk.is_empty() {
                    let _ = tx.blocking_send(Ok(chunk));
                }
                return Err(e.into());
            }
        }

        if cancel.is_cancelled() {
            debug!("tabular parse cancelled");
            return Ok(());
        }

        let candidate = record
            .get(index)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string);
        let fields = headers.iter().zip(record.iter()).collect();
        chunk.push(TabularRow { candidate, fields });

        if chunk.len() >= chunk_size {
            let full = std::mem::replace(&mut chunk, Vec::with_capacity(chunk_size));
            if tx.blocking_send(Ok(full)).is_err() {
                return Ok(());
            }
        }
    }

    if !chunk.is_empty() {
        let _ = tx.blocking_send(Ok(chunk));
    }
    Ok(())
}
