//! Typed time series loaded from the raw data table.
//!
//! Data rows are parsed leniently, matching the device-export dialect: short
//! rows are padded with missing fields, non-numeric fields keep their raw
//! text, and rows whose timestamp does not parse are dropped and counted
//! rather than failing the run.

use crate::document::{FormatError, DELIMITER, TIMESTAMP_COLUMN};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, warn};

/// Day-first timestamp formats accepted in the timestamp column, tried in
/// order. The device writes the first; the others appear in hand-edited
/// exports.
const TIMESTAMP_FORMATS: [&str; 2] = ["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"];

/// Date-only fallback; parsed as midnight.
const DATE_ONLY_FORMAT: &str = "%d/%m/%Y";

/// One field of a sample after numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Field parsed as a finite number
    Number(f64),
    /// Field kept as its original text
    Text(String),
    /// Field was absent or empty
    Missing,
}

impl FieldValue {
    /// Coerce a raw field. Empty and non-finite values become `Missing`;
    /// anything that is not a finite number keeps its text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return FieldValue::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => FieldValue::Number(value),
            Ok(_) => FieldValue::Missing,
            Err(_) => FieldValue::Text(trimmed.to_string()),
        }
    }

    /// Numeric view of the field, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            _ => None,
        }
    }
}

/// One typed row of the table.
#[derive(Debug, Clone)]
pub struct Sample {
    /// Parsed timestamp of the row
    pub timestamp: NaiveDateTime,
    /// Field values aligned to [`SeriesTable::columns`]
    pub values: Vec<FieldValue>,
}

/// The full typed series, sorted ascending by timestamp.
#[derive(Debug, Clone)]
pub struct SeriesTable {
    /// Non-timestamp column names, in original header order
    pub columns: Vec<String>,
    /// Samples in non-decreasing timestamp order (ties keep file order)
    pub samples: Vec<Sample>,
}

/// Row-level counters from one load, for diagnostics only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadStats {
    /// Data rows read from the table (blank lines excluded)
    pub rows_read: u64,
    /// Rows dropped for an unparseable timestamp
    pub rows_dropped: u64,
    /// Rows shorter than the header, padded with missing fields
    pub short_rows: u64,
}

/// Parse the raw data lines into a sorted [`SeriesTable`].
///
/// Fails only when the header carries no timestamp column; every row-level
/// irregularity is absorbed and counted in the returned [`LoadStats`].
pub fn load_series(
    header: &[String],
    data_lines: &[String],
) -> Result<(SeriesTable, LoadStats), FormatError> {
    let timestamp_idx = header
        .iter()
        .position(|name| name == TIMESTAMP_COLUMN)
        .ok_or(FormatError::MissingTimestampColumn)?;

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != timestamp_idx)
        .map(|(_, name)| name.clone())
        .collect();

    let joined = data_lines.join("\n");
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER as u8)
        .has_headers(false)
        .flexible(true)
        .from_reader(joined.as_bytes());

    let mut stats = LoadStats::default();
    let mut samples = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("skipping unreadable data row {}: {e}", row_idx + 1);
                stats.rows_read += 1;
                stats.rows_dropped += 1;
                continue;
            }
        };
        stats.rows_read += 1;

        let timestamp = match record.get(timestamp_idx).map(parse_timestamp) {
            Some(Some(ts)) => ts,
            _ => {
                debug!(
                    "dropping row {}: unparseable timestamp {:?}",
                    row_idx + 1,
                    record.get(timestamp_idx).unwrap_or("")
                );
                stats.rows_dropped += 1;
                continue;
            }
        };

        if record.len() < header.len() {
            stats.short_rows += 1;
        }

        let values: Vec<FieldValue> = (0..header.len())
            .filter(|idx| *idx != timestamp_idx)
            .map(|idx| match record.get(idx) {
                Some(raw) => FieldValue::parse(raw),
                None => FieldValue::Missing,
            })
            .collect();

        samples.push(Sample { timestamp, values });
    }

    // Stable sort: rows sharing a timestamp keep their file order.
    samples.sort_by_key(|sample| sample.timestamp);

    debug!(
        "loaded {} samples ({} rows read, {} dropped, {} short)",
        samples.len(),
        stats.rows_read,
        stats.rows_dropped,
        stats.short_rows
    );

    Ok((SeriesTable { columns, samples }, stats))
}

/// Parse a day-first timestamp, trying each accepted format.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(trimmed, DATE_ONLY_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn lines(rows: &[&str]) -> Vec<String> {
        rows.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_field_value_coercion() {
        assert_eq!(FieldValue::parse("42"), FieldValue::Number(42.0));
        assert_eq!(FieldValue::parse(" 3.5 "), FieldValue::Number(3.5));
        assert_eq!(FieldValue::parse(""), FieldValue::Missing);
        assert_eq!(FieldValue::parse("nan"), FieldValue::Missing);
        assert_eq!(
            FieldValue::parse("AWAKE"),
            FieldValue::Text("AWAKE".to_string())
        );
    }

    #[test]
    fn test_load_sorts_by_timestamp() {
        let header = header(&["DATE/TIME", "PIM"]);
        let rows = lines(&[
            "01/02/2024 00:00:02;2",
            "01/02/2024 00:00:00;0",
            "01/02/2024 00:00:01;1",
        ]);

        let (table, stats) = load_series(&header, &rows).unwrap();
        assert_eq!(stats.rows_read, 3);
        assert_eq!(stats.rows_dropped, 0);

        let values: Vec<f64> = table
            .samples
            .iter()
            .filter_map(|s| s.values[0].as_number())
            .collect();
        assert_eq!(values, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_bad_timestamp_row_dropped_and_counted() {
        let header = header(&["DATE/TIME", "PIM"]);
        let rows = lines(&["01/02/2024 00:00:00;1", "not a date;2"]);

        let (table, stats) = load_series(&header, &rows).unwrap();
        assert_eq!(table.samples.len(), 1);
        assert_eq!(stats.rows_dropped, 1);
    }

    #[test]
    fn test_short_rows_padded() {
        let header = header(&["DATE/TIME", "PIM", "ZCM", "STATE"]);
        let rows = lines(&["01/02/2024 00:00:00;7"]);

        let (table, stats) = load_series(&header, &rows).unwrap();
        assert_eq!(stats.short_rows, 1);

        let sample = &table.samples[0];
        assert_eq!(sample.values[0], FieldValue::Number(7.0));
        assert_eq!(sample.values[1], FieldValue::Missing);
        assert_eq!(sample.values[2], FieldValue::Missing);
    }

    #[test]
    fn test_non_numeric_field_retained() {
        let header = header(&["DATE/TIME", "STATE"]);
        let rows = lines(&["01/02/2024 00:00:00;ASLEEP"]);

        let (table, _) = load_series(&header, &rows).unwrap();
        assert_eq!(
            table.samples[0].values[0],
            FieldValue::Text("ASLEEP".to_string())
        );
    }

    #[test]
    fn test_missing_timestamp_column() {
        let header = header(&["TIME", "PIM"]);
        let rows = lines(&["01/02/2024 00:00:00;1"]);

        assert!(matches!(
            load_series(&header, &rows),
            Err(FormatError::MissingTimestampColumn)
        ));
    }

    #[test]
    fn test_minute_precision_timestamps_accepted() {
        let header = header(&["DATE/TIME", "PIM"]);
        let rows = lines(&["01/02/2024 13:45;5"]);

        let (table, stats) = load_series(&header, &rows).unwrap();
        assert_eq!(stats.rows_dropped, 0);
        assert_eq!(
            table.samples[0].timestamp,
            NaiveDate::from_ymd_opt(2024, 2, 1)
                .unwrap()
                .and_hms_opt(13, 45, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_ties_keep_file_order() {
        let header = header(&["DATE/TIME", "EVENT"]);
        let rows = lines(&[
            "01/02/2024 00:00:00;1",
            "01/02/2024 00:00:00;2",
            "01/02/2024 00:00:00;3",
        ]);

        let (table, _) = load_series(&header, &rows).unwrap();
        let values: Vec<f64> = table
            .samples
            .iter()
            .filter_map(|s| s.values[0].as_number())
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }
}
