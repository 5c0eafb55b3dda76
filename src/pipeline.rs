//! The conversion pipeline: split -> load -> aggregate -> encode.
//!
//! One synchronous pass over one document. Every fatal condition aborts
//! before any output text is produced; row-level irregularities are
//! absorbed by the loader and surface only in the report.

use crate::core::{aggregate, load_series, CondorEncoder, OutputMode};
use crate::document::{split_document, FormatError};
use crate::report::ConversionReport;
use chrono::{Local, NaiveDateTime};
use log::debug;

/// Parameters for one conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Target epoch length in seconds; must be positive
    pub epoch_seconds: u32,
    /// Preamble and header handling
    pub mode: OutputMode,
    /// Subject name written to the synthesized preamble, usually the input
    /// file's base name
    pub subject: String,
    /// `FILE_DATE_TIME` of the synthesized preamble; the current local time
    /// when not set
    pub created_at: Option<NaiveDateTime>,
}

impl ConvertOptions {
    pub fn new(epoch_seconds: u32, mode: OutputMode, subject: impl Into<String>) -> Self {
        Self {
            epoch_seconds,
            mode,
            subject: subject.into(),
            created_at: None,
        }
    }
}

/// A finished conversion: the full output text plus run diagnostics.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Complete output document, trailing newline included
    pub output: String,
    pub report: ConversionReport,
}

/// Fatal pipeline failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// The input does not follow the export dialect
    Format(FormatError),
    /// Bucketing produced zero epochs (no valid timestamped rows)
    EmptyResult,
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvertError::Format(e) => write!(f, "{e}"),
            ConvertError::EmptyResult => write!(f, "no epochs were found after resampling"),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::Format(e) => Some(e),
            ConvertError::EmptyResult => None,
        }
    }
}

impl From<FormatError> for ConvertError {
    fn from(e: FormatError) -> Self {
        ConvertError::Format(e)
    }
}

/// Convert raw file bytes.
///
/// Decoding is lenient: undecodable bytes are replaced, never fatal.
pub fn convert_bytes(bytes: &[u8], options: &ConvertOptions) -> Result<Conversion, ConvertError> {
    convert_text(&String::from_utf8_lossy(bytes), options)
}

/// Convert an already-decoded document.
pub fn convert_text(text: &str, options: &ConvertOptions) -> Result<Conversion, ConvertError> {
    let lines: Vec<&str> = text.lines().collect();
    let document = split_document(&lines)?;
    debug!(
        "document split: {} preamble lines, {} columns, {} data lines",
        document.preamble.len(),
        document.header.len(),
        document.data_lines.len()
    );

    let (series, stats) = load_series(&document.header, &document.data_lines)?;
    let table = aggregate(&series, options.epoch_seconds);

    if table.epochs.is_empty() {
        return Err(ConvertError::EmptyResult);
    }

    let created_at = options
        .created_at
        .unwrap_or_else(|| Local::now().naive_local());
    let encoder = CondorEncoder::new(options.mode, options.subject.clone(), created_at);
    let output = encoder.encode(&document, &table);

    let report = ConversionReport::new(series.columns.clone(), stats, &table);
    debug!(
        "conversion finished: {} epochs, {} rows dropped",
        report.epochs_emitted, report.rows_dropped
    );

    Ok(Conversion { output, report })
}
