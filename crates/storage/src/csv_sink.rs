//! CSV export: one history table and one lane summary table

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::report::TollReport;
use crate::{HistorySink, StorageError};

pub const DEFAULT_HISTORY_FILE: &str = "vehicle_detection_data.csv";
pub const DEFAULT_SUMMARY_FILE: &str = "lane_vehicle_counts.csv";

/// Writes `id,vehicle_type,lane,timestamp_ms,payment_status,toll_fee`
/// rows plus a `lane,vehicle_type,count` summary
pub struct CsvSink {
    history_path: PathBuf,
    summary_path: PathBuf,
}

impl CsvSink {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        let dir = output_dir.as_ref();
        Self {
            history_path: dir.join(DEFAULT_HISTORY_FILE),
            summary_path: dir.join(DEFAULT_SUMMARY_FILE),
        }
    }

    pub fn with_files(history_path: impl Into<PathBuf>, summary_path: impl Into<PathBuf>) -> Self {
        Self {
            history_path: history_path.into(),
            summary_path: summary_path.into(),
        }
    }

    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    pub fn summary_path(&self) -> &Path {
        &self.summary_path
    }
}

fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

impl HistorySink for CsvSink {
    fn write(&self, report: &TollReport) -> Result<(), StorageError> {
        ensure_parent(&self.history_path)?;
        ensure_parent(&self.summary_path)?;

        let mut writer = csv::Writer::from_path(&self.history_path)?;
        if report.records.is_empty() {
            writer.write_record([
                "id",
                "vehicle_type",
                "lane",
                "timestamp_ms",
                "payment_status",
                "toll_fee",
            ])?;
        }
        for record in &report.records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        let mut writer = csv::Writer::from_path(&self.summary_path)?;
        if report.lane_summary.is_empty() {
            writer.write_record(["lane", "vehicle_type", "count"])?;
        }
        for row in &report.lane_summary {
            writer.serialize(row)?;
        }
        writer.flush()?;

        info!(
            "Toll history saved to {} ({} records), lane counts to {}",
            self.history_path.display(),
            report.records.len(),
            self.summary_path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toll_ledger::{HistoryAggregator, HistoryRecord, PaymentStatus};

    fn report() -> TollReport {
        let records = vec![
            HistoryRecord {
                id: 7,
                vehicle_type: "4-wheel".to_string(),
                lane: 2,
                timestamp_ms: 400,
                payment_status: PaymentStatus::AwaitingPayment,
                toll_fee: 30,
            },
            HistoryRecord {
                id: 9,
                vehicle_type: "6-wheel".to_string(),
                lane: 1,
                timestamp_ms: 880,
                payment_status: PaymentStatus::Paid,
                toll_fee: 75,
            },
        ];
        TollReport {
            lane_summary: HistoryAggregator::lane_summary(&records),
            records,
            ..Default::default()
        }
    }

    #[test]
    fn test_writes_both_tables() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path().join("outputs"));
        sink.write(&report()).unwrap();

        let history = fs::read_to_string(sink.history_path()).unwrap();
        let lines: Vec<&str> = history.lines().collect();
        assert_eq!(
            lines,
            vec![
                "id,vehicle_type,lane,timestamp_ms,payment_status,toll_fee",
                "7,4-wheel,2,400,awaiting payment,30",
                "9,6-wheel,1,880,paid,75",
            ]
        );

        let summary = fs::read_to_string(sink.summary_path()).unwrap();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(
            lines,
            vec![
                "lane,vehicle_type,count",
                "1,6-wheel,1",
                "1,TOTAL,1",
                "2,4-wheel,1",
                "2,TOTAL,1",
            ]
        );
    }

    #[test]
    fn test_empty_report_writes_headers() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path());
        sink.write(&TollReport::default()).unwrap();

        let history = fs::read_to_string(sink.history_path()).unwrap();
        assert_eq!(
            history.trim_end(),
            "id,vehicle_type,lane,timestamp_ms,payment_status,toll_fee"
        );
    }

    #[test]
    fn test_unwritable_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();

        let sink = CsvSink::new(blocker.join("nested"));
        assert!(matches!(sink.write(&report()), Err(StorageError::Io(_))));
    }
}
