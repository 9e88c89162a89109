//! CSV export of daily ledger records.

use calbank_core::{DailyCalorieRecord, Result};
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    date: String,
    consumed: i32,
    burned: i32,
    target: i32,
    locked_target: Option<i32>,
    banking_adjustment: i32,
    effective_target: i32,
}

impl From<&DailyCalorieRecord> for CsvRow {
    fn from(record: &DailyCalorieRecord) -> Self {
        CsvRow {
            date: record.date.to_string(),
            consumed: record.consumed,
            burned: record.burned,
            target: record.target,
            locked_target: record.locked_target,
            banking_adjustment: record.banking_adjustment,
            effective_target: record.effective_target(),
        }
    }
}

/// Write all records to a CSV file (with headers), returning the row count.
pub fn write_records_csv(records: &[DailyCalorieRecord], path: &Path) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }
    writer.flush()?;
    tracing::info!("Exported {} records to {:?}", records.len(), path);
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_export_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("week.csv");

        let records = vec![DailyCalorieRecord {
            date: NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
            consumed: 1900,
            burned: 200,
            target: 2000,
            locked_target: Some(2000),
            banking_adjustment: 0,
        }];

        let count = write_records_csv(&records, &path).unwrap();
        assert_eq!(count, 1);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("date,consumed,burned"));
        assert!(contents.contains("2026-08-24,1900,200,2000"));
    }
}
