//! Conversion diagnostics.
//!
//! Tracks what one run read, tolerated, and emitted, without holding any of
//! the sample data itself. The report is returned to callers alongside the
//! output text; the CLI decides what to show or persist.

use crate::core::series::LoadStats;
use crate::core::EpochTable;
use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

/// Summary of one conversion run.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    /// Unique identifier for this run
    pub run_id: Uuid,
    /// Data rows read from the table
    pub rows_read: u64,
    /// Rows dropped for an unparseable timestamp
    pub rows_dropped: u64,
    /// Rows shorter than the header, padded with missing fields
    pub short_rows: u64,
    /// Samples that entered aggregation
    pub samples_loaded: u64,
    /// Epochs emitted, gap epochs included
    pub epochs_emitted: u64,
    /// Emitted epochs with no contributing samples
    pub empty_epochs: u64,
    /// Epoch length used for the run
    pub epoch_seconds: u32,
    /// Start of the first emitted epoch
    pub first_epoch: Option<NaiveDateTime>,
    /// Start of the last emitted epoch
    pub last_epoch: Option<NaiveDateTime>,
    /// Non-timestamp columns found in the input, in file order
    pub columns: Vec<String>,
}

impl ConversionReport {
    /// Build a report from the loader counters and the aggregated table.
    pub fn new(columns: Vec<String>, stats: LoadStats, table: &EpochTable) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            rows_read: stats.rows_read,
            rows_dropped: stats.rows_dropped,
            short_rows: stats.short_rows,
            samples_loaded: stats.rows_read - stats.rows_dropped,
            epochs_emitted: table.epochs.len() as u64,
            empty_epochs: table.empty_epoch_count(),
            epoch_seconds: table.epoch_seconds,
            first_epoch: table.first_epoch(),
            last_epoch: table.last_epoch(),
            columns,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        format!(
            "Conversion Summary:\n\
             - Data rows read: {}\n\
             - Rows dropped (bad timestamp): {}\n\
             - Short rows padded: {}\n\
             - Samples aggregated: {}\n\
             - Epochs emitted: {} ({}s each, {} empty)\n\
             - Collection span: {} to {}",
            self.rows_read,
            self.rows_dropped,
            self.short_rows,
            self.samples_loaded,
            self.epochs_emitted,
            self.epoch_seconds,
            self.empty_epochs,
            self.first_epoch
                .map(crate::core::format_timestamp)
                .unwrap_or_else(|| "-".to_string()),
            self.last_epoch
                .map(crate::core::format_timestamp)
                .unwrap_or_else(|| "-".to_string()),
        )
    }
}
