//! Core functionality for the MotionLogger-to-Condor converter.
//!
//! This module contains:
//! - Time-series loading from the raw data table
//! - Epoch aggregation under per-column rules
//! - Condor document encoding with trimmed decimal formatting

pub mod aggregate;
pub mod encode;
pub mod series;

// Re-export commonly used types
pub use aggregate::{aggregate, AggregationRule, ColumnCategory, Epoch, EpochTable};
pub use encode::{format_timestamp, CondorEncoder, OutputMode, OUTPUT_COLUMNS};
pub use series::{load_series, FieldValue, LoadStats, Sample, SeriesTable};
