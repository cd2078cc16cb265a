//! Storage Layer
//!
//! Flushes the in-memory toll history to durable sinks. A failed flush
//! is reported to the caller and never touches the history itself.

mod csv_sink;
mod json_sink;
mod memory;
mod report;

pub use csv_sink::CsvSink;
pub use json_sink::JsonSink;
pub use memory::MemorySink;
pub use report::TollReport;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<csv::Error> for StorageError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            StorageError::Io(err.to_string())
        } else {
            StorageError::Serialization(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Destination for a full history flush
pub trait HistorySink {
    fn write(&self, report: &TollReport) -> Result<(), StorageError>;
}
