//! In-memory sink

use std::sync::Mutex;

use tracing::debug;

use crate::report::TollReport;
use crate::{HistorySink, StorageError};

/// Keeps every flushed report (for tests and embedding)
#[derive(Default)]
pub struct MemorySink {
    flushes: Mutex<Vec<TollReport>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.lock().map(|f| f.len()).unwrap_or(0)
    }

    /// Most recent flushed report
    pub fn latest(&self) -> Option<TollReport> {
        self.flushes.lock().ok().and_then(|f| f.last().cloned())
    }
}

impl HistorySink for MemorySink {
    fn write(&self, report: &TollReport) -> Result<(), StorageError> {
        let mut flushes = self
            .flushes
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        flushes.push(report.clone());
        debug!("Stored report #{} in memory", flushes.len());
        Ok(())
    }
}
