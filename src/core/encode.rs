//! Rendering aggregated epochs back into the Condor text dialect.
//!
//! Each output column has a fixed decimal treatment that reproduces the
//! device's trimming conventions: fixed precision, trailing zeros and the
//! trailing point removed, and `-0` collapsed to `0`. Missing aggregates
//! render as empty fields.

use crate::core::aggregate::{ColumnCategory, EpochTable};
use crate::document::{ParsedDocument, DELIMITER, TIMESTAMP_COLUMN};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Canonical Condor column order used in reconstructed-header mode.
pub const OUTPUT_COLUMNS: [&str; 9] = [
    "DATE/TIME",
    "EVENT",
    "EXT TEMPERATURE",
    "PIM",
    "PIMn",
    "ZCM",
    "ZCMn",
    "LIGHT",
    "STATE",
];

/// Timestamp rendering used for epochs and synthesized metadata.
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

const BANNER_TOP: &str =
    "+-------------+ MotionLogger Conversion to Condor Report +-------------+";
const BANNER_BOTTOM: &str =
    "+----------------------------------------------------------------------+";

/// How the output document's preamble and header are produced.
///
/// Both modes share all aggregation and field formatting; they differ only
/// in preamble and column-order handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Canonical column order with a synthesized metadata preamble
    Reconstruct,
    /// Original column order with the input preamble passed through verbatim
    Preserve,
}

impl OutputMode {
    /// Parse a mode name as given on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "reconstruct" => Some(OutputMode::Reconstruct),
            "preserve" => Some(OutputMode::Preserve),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputMode::Reconstruct => write!(f, "reconstruct"),
            OutputMode::Preserve => write!(f, "preserve"),
        }
    }
}

/// Encodes an aggregated table into a complete Condor document.
pub struct CondorEncoder {
    mode: OutputMode,
    subject: String,
    created_at: NaiveDateTime,
}

impl CondorEncoder {
    /// Create an encoder.
    ///
    /// `subject` and `created_at` only appear in the synthesized preamble of
    /// [`OutputMode::Reconstruct`].
    pub fn new(mode: OutputMode, subject: impl Into<String>, created_at: NaiveDateTime) -> Self {
        Self {
            mode,
            subject: subject.into(),
            created_at,
        }
    }

    /// Render the full output document, trailing newline included.
    pub fn encode(&self, document: &ParsedDocument, table: &EpochTable) -> String {
        let delimiter = DELIMITER.to_string();

        let mut lines: Vec<String> = match self.mode {
            OutputMode::Reconstruct => self.synthesize_preamble(table),
            OutputMode::Preserve => document.preamble.clone(),
        };

        let output_columns: Vec<&str> = match self.mode {
            OutputMode::Reconstruct => OUTPUT_COLUMNS.to_vec(),
            OutputMode::Preserve => document.header.iter().map(String::as_str).collect(),
        };
        lines.push(output_columns.join(&delimiter));

        for epoch in &table.epochs {
            let fields: Vec<String> = output_columns
                .iter()
                .map(|column| {
                    if *column == TIMESTAMP_COLUMN {
                        format_timestamp(epoch.start)
                    } else {
                        let value = table
                            .column_index(column)
                            .and_then(|idx| epoch.values[idx]);
                        render_field(ColumnCategory::from_name(column), value)
                    }
                })
                .collect();
            lines.push(fields.join(&delimiter));
        }

        let mut output = lines.join("\n");
        output.push('\n');
        output
    }

    /// Fixed-format metadata block for reconstructed output.
    fn synthesize_preamble(&self, table: &EpochTable) -> Vec<String> {
        let first = table.first_epoch().map(format_timestamp).unwrap_or_default();
        let last = table.last_epoch().map(format_timestamp).unwrap_or_default();

        vec![
            BANNER_TOP.to_string(),
            format!("SUBJECT_NAME : {}", self.subject),
            "SUBJECT_DESCRIPTION :".to_string(),
            "DEVICE_ID : Micro MotionLogger".to_string(),
            format!("FILE_DATE_TIME : {}", format_timestamp(self.created_at)),
            format!("Collection_Start: {first}"),
            format!("Collection_End: {last}"),
            format!("Epoch_Duration:  {}", table.epoch_seconds),
            BANNER_BOTTOM.to_string(),
        ]
    }
}

/// Render an epoch timestamp as `DD/MM/YYYY HH:MM:SS`.
pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(OUTPUT_TIMESTAMP_FORMAT).to_string()
}

/// Render one aggregated field under the column's numeric treatment.
fn render_field(category: ColumnCategory, value: Option<f64>) -> String {
    let Some(value) = value else {
        return String::new();
    };

    match category {
        ColumnCategory::Event | ColumnCategory::Zcm | ColumnCategory::State => {
            (value.round() as i64).to_string()
        }
        ColumnCategory::Pim | ColumnCategory::Light => format_trimmed(value, 6),
        ColumnCategory::PimRate => format_trimmed(value, 15),
        ColumnCategory::ZcmRate => format_trimmed(value, 3),
        ColumnCategory::ExtTemperature => format_trimmed(value, 9),
        ColumnCategory::Other => format_trimmed(value, 6),
    }
}

/// Fixed-precision rendering with trailing zeros and the trailing decimal
/// point removed; values that reduce to `-0` or nothing render as `0`.
fn format_trimmed(value: f64, max_decimals: usize) -> String {
    let formatted = format!("{value:.max_decimals$}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregate::aggregate;
    use crate::core::series::load_series;
    use crate::document::split_document;
    use chrono::NaiveDate;

    fn created() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn encode(text: &str, epoch_seconds: u32, mode: OutputMode) -> String {
        let lines: Vec<&str> = text.lines().collect();
        let document = split_document(&lines).unwrap();
        let (series, _) = load_series(&document.header, &document.data_lines).unwrap();
        let table = aggregate(&series, epoch_seconds);
        CondorEncoder::new(mode, "subject01", created()).encode(&document, &table)
    }

    #[test]
    fn test_format_trimmed() {
        assert_eq!(format_trimmed(30.0, 6), "30");
        assert_eq!(format_trimmed(0.5, 15), "0.5");
        assert_eq!(format_trimmed(20.000, 3), "20");
        assert_eq!(format_trimmed(3.140000, 6), "3.14");
        assert_eq!(format_trimmed(-0.0000001, 3), "0");
        assert_eq!(format_trimmed(0.0, 6), "0");
    }

    #[test]
    fn test_format_trimmed_idempotent() {
        for (value, decimals) in [(0.5, 15), (36.600000001, 9), (1.0 / 3.0, 6), (12.0, 3)] {
            let once = format_trimmed(value, decimals);
            let reparsed: f64 = once.parse().unwrap();
            assert_eq!(format_trimmed(reparsed, decimals), once);
        }
    }

    #[test]
    fn test_integer_render_rounds() {
        assert_eq!(render_field(ColumnCategory::Event, Some(1.6)), "2");
        assert_eq!(render_field(ColumnCategory::State, Some(5.0)), "5");
        assert_eq!(render_field(ColumnCategory::Zcm, None), "");
    }

    #[test]
    fn test_missing_sum_renders_empty_not_zero() {
        assert_eq!(render_field(ColumnCategory::Pim, None), "");
        assert_eq!(render_field(ColumnCategory::Light, None), "");
    }

    #[test]
    fn test_reconstruct_mode_canonical_row() {
        let text = "meta line\n\
                    DATE/TIME;EVENT;PIM;ZCM;STATE\n\
                    01/02/2024 00:00:10;1;10;0;5\n\
                    01/02/2024 00:00:11;1;20;0;5\n";
        let output = encode(text, 60, OutputMode::Reconstruct);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], BANNER_TOP);
        assert_eq!(lines[1], "SUBJECT_NAME : subject01");
        assert_eq!(lines[3], "DEVICE_ID : Micro MotionLogger");
        assert_eq!(lines[4], "FILE_DATE_TIME : 01/03/2024 12:00:00");
        assert_eq!(lines[5], "Collection_Start: 01/02/2024 00:00:00");
        assert_eq!(lines[6], "Collection_End: 01/02/2024 00:00:00");
        assert_eq!(lines[7], "Epoch_Duration:  60");
        assert_eq!(lines[8], BANNER_BOTTOM);
        assert_eq!(
            lines[9],
            "DATE/TIME;EVENT;EXT TEMPERATURE;PIM;PIMn;ZCM;ZCMn;LIGHT;STATE"
        );
        // EXT TEMPERATURE and LIGHT were absent from input: empty fields.
        assert_eq!(lines[10], "01/02/2024 00:00:00;2;;30;0.5;0;0;;5");
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn test_preserve_mode_keeps_header_and_preamble() {
        let text = "device preamble\nsecond line\n\
                    DATE/TIME;PIM;EVENT\n\
                    01/02/2024 00:00:10;10;1\n";
        let output = encode(text, 60, OutputMode::Preserve);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "device preamble");
        assert_eq!(lines[1], "second line");
        assert_eq!(lines[2], "DATE/TIME;PIM;EVENT");
        assert_eq!(lines[3], "01/02/2024 00:00:00;10;1");
    }

    #[test]
    fn test_preserve_mode_rate_column_freshly_derived() {
        // Input ZCMn values never reach the output; the column is recomputed
        // from the ZCM sum.
        let text = "DATE/TIME;ZCM;ZCMn\n\
                    01/02/2024 00:00:00;3;99\n\
                    01/02/2024 00:00:01;3;99\n";
        let output = encode(text, 60, OutputMode::Preserve);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[1], "01/02/2024 00:00:00;6;0.1");
    }

    #[test]
    fn test_mode_from_name() {
        assert_eq!(
            OutputMode::from_name("Reconstruct"),
            Some(OutputMode::Reconstruct)
        );
        assert_eq!(OutputMode::from_name("preserve"), Some(OutputMode::Preserve));
        assert_eq!(OutputMode::from_name("condor"), None);
    }
}
