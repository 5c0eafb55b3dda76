//! Splitting a raw export into preamble, table header, and data lines.
//!
//! MotionLogger exports carry a free-form metadata preamble followed by one
//! table header line and the per-sample data rows. The header line is the
//! first line starting with `DATE/TIME;` and is the only structural anchor
//! the dialect guarantees.

/// Field delimiter used throughout the Condor dialect.
pub const DELIMITER: char = ';';

/// Name of the timestamp column; also the sentinel prefix of the header line.
pub const TIMESTAMP_COLUMN: &str = "DATE/TIME";

/// A raw export split into its three sections.
///
/// `header` holds the column names in file order; the first entry is always
/// [`TIMESTAMP_COLUMN`]. `data_lines` are untyped and unvalidated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Metadata lines preceding the table header, verbatim
    pub preamble: Vec<String>,
    /// Column names from the header line, in file order
    pub header: Vec<String>,
    /// Raw data lines following the header
    pub data_lines: Vec<String>,
}

impl ParsedDocument {
    /// Reassemble the header line exactly as it appeared in the file.
    pub fn header_line(&self) -> String {
        self.header.join(&DELIMITER.to_string())
    }
}

/// Structural errors in the export dialect.
///
/// These are the fatal parse failures; row-level irregularities are
/// tolerated further down the pipeline and never surface here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// No line starting with `DATE/TIME;` was found
    NoHeaderFound,
    /// The first header field is not the timestamp column
    BadHeader,
    /// The timestamp column is absent from the header
    MissingTimestampColumn,
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::NoHeaderFound => write!(
                f,
                "could not find the data table header line starting with '{TIMESTAMP_COLUMN}{DELIMITER}'"
            ),
            FormatError::BadHeader => write!(f, "unexpected table header format"),
            FormatError::MissingTimestampColumn => {
                write!(f, "missing '{TIMESTAMP_COLUMN}' column")
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// Split a raw export into preamble, header, and data lines.
///
/// Scans for the first line beginning with the sentinel prefix
/// `DATE/TIME;`. Everything before it is preamble and passed through
/// untouched; everything after it is raw table data.
pub fn split_document(lines: &[&str]) -> Result<ParsedDocument, FormatError> {
    let sentinel = format!("{TIMESTAMP_COLUMN}{DELIMITER}");

    let header_idx = lines
        .iter()
        .position(|line| line.starts_with(&sentinel))
        .ok_or(FormatError::NoHeaderFound)?;

    let header: Vec<String> = lines[header_idx]
        .split(DELIMITER)
        .map(str::to_string)
        .collect();

    if header.first().map(String::as_str) != Some(TIMESTAMP_COLUMN) {
        return Err(FormatError::BadHeader);
    }

    Ok(ParsedDocument {
        preamble: lines[..header_idx].iter().map(|s| s.to_string()).collect(),
        header,
        data_lines: lines[header_idx + 1..]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    })
}
