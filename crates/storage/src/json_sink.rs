//! JSON export of the full report

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::report::TollReport;
use crate::{HistorySink, StorageError};

pub const DEFAULT_REPORT_FILE: &str = "toll_report.json";

pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            path: output_dir.as_ref().join(DEFAULT_REPORT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistorySink for JsonSink {
    fn write(&self, report: &TollReport) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(writer, report)?;

        info!(
            "Toll report saved to {} ({} records)",
            self.path.display(),
            report.records.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toll_ledger::{HistoryRecord, PaymentStatus};

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonSink::new(dir.path());
        let report = TollReport {
            records: vec![HistoryRecord {
                id: 1,
                vehicle_type: "6-more-wheel".to_string(),
                lane: 3,
                timestamp_ms: 1200,
                payment_status: PaymentStatus::AwaitingPayment,
                toll_fee: 120,
            }],
            total_fees: 120,
            outstanding_fees: 120,
            ..Default::default()
        };

        sink.write(&report).unwrap();
        let text = fs::read_to_string(sink.path()).unwrap();
        assert!(text.contains("\"awaiting payment\""));
        let parsed: TollReport = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, report);
    }
}
