//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classify::ClassifierConfig;
use crate::error::{Error, Result};

/// Default number of rows per streamed chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default number of parsed chunks allowed to wait for ingestion.
pub const DEFAULT_MAX_CHUNKS_IN_FLIGHT: usize = 2;

/// Default capacity of the engine's event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rows per chunk handed from the tabular parser to the session.
    pub chunk_size: usize,
    /// Parsed chunks allowed to queue ahead of ingestion.
    pub max_chunks_in_flight: usize,
    /// Count address-like text fragments that fail the pattern as invalid.
    pub report_unmatched_text: bool,
    /// Capacity of the event channel. Progress events are dropped when full.
    pub event_capacity: usize,
    /// Classification lists.
    pub classifier: ClassifierConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_chunks_in_flight: DEFAULT_MAX_CHUNKS_IN_FLIGHT,
            report_unmatched_text: true,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            classifier: ClassifierConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    /// Parses configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        Self::from_json(&contents)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be at least 1".to_string()));
        }
        if self.max_chunks_in_flight == 0 {
            return Err(Error::Config(
                "max_chunks_in_flight must be at least 1".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(Error::Config("event_capacity must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Builder for engine configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Creates a builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rows per chunk.
    #[must_use]
    pub const fn chunk_size(mut self, rows: usize) -> Self {
        self.config.chunk_size = rows;
        self
    }

    /// Sets how many chunks may queue ahead of ingestion.
    #[must_use]
    pub const fn max_chunks_in_flight(mut self, chunks: usize) -> Self {
        self.config.max_chunks_in_flight = chunks;
        self
    }

    /// Sets whether unmatched text fragments count as invalid.
    #[must_use]
    pub const fn report_unmatched_text(mut self, report: bool) -> Self {
        self.config.report_unmatched_text = report;
        self
    }

    /// Sets the event channel capacity.
    #[must_use]
    pub const fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    /// Sets the classification lists.
    #[must_use]
    pub fn classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.config.classifier = classifier;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a value is out of range.
    pub fn build(self) -> Result<EngineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
