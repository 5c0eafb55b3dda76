//! MotionLogger to Condor - fixed-epoch actigraphy condenser.
//!
//! This library converts MotionLogger actigraphy exports (a free-form
//! metadata preamble followed by a `;`-delimited sample table) into a
//! coarser, fixed-epoch Condor report in the same dialect.
//!
//! # Tolerance Guarantees
//!
//! - **Lenient decoding**: undecodable bytes are replaced, never fatal
//! - **Lenient rows**: short rows are padded; non-numeric fields keep
//!   their text; rows with bad timestamps are dropped and counted
//! - **No partial output**: a fatal format error aborts before any output
//!   text exists
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MotionLogger → Condor                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │  Splitter   │──▶│   Loader    │──▶│ Aggregator  │        │
//! │  │ (sentinel)  │   │ (typed rows)│   │  (epochs)   │        │
//! │  └─────────────┘   └─────────────┘   └──────┬──────┘        │
//! │                                             ▼               │
//! │  ┌─────────────┐                     ┌─────────────┐        │
//! │  │ Conversion  │◀────────────────────│   Encoder   │        │
//! │  │   Report    │                     │  (Condor)   │        │
//! │  └─────────────┘                     └─────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use motionlog_condor::{convert_text, ConvertOptions, OutputMode};
//!
//! let text = "DATE/TIME;EVENT;PIM\n01/02/2024 00:00:10;1;10\n";
//! let options = ConvertOptions::new(60, OutputMode::Preserve, "subject01");
//!
//! let conversion = convert_text(text, &options).expect("valid export");
//! assert_eq!(conversion.report.epochs_emitted, 1);
//! ```

pub mod config;
pub mod core;
pub mod document;
pub mod pipeline;
pub mod report;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use core::{
    aggregate, load_series, AggregationRule, ColumnCategory, CondorEncoder, EpochTable,
    FieldValue, OutputMode, SeriesTable, OUTPUT_COLUMNS,
};
pub use document::{split_document, FormatError, ParsedDocument, DELIMITER, TIMESTAMP_COLUMN};
pub use pipeline::{convert_bytes, convert_text, Conversion, ConvertError, ConvertOptions};
pub use report::ConversionReport;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_columns_start_with_timestamp() {
        assert_eq!(OUTPUT_COLUMNS[0], TIMESTAMP_COLUMN);
        assert_eq!(OUTPUT_COLUMNS.len(), 9);
    }
}
