//! Document handling for MotionLogger text exports.
//!
//! This module provides the input boundary of the pipeline: locating the
//! data table inside a raw export and splitting it from the free-form
//! metadata preamble.

pub mod splitter;

// Re-export commonly used types
pub use splitter::{split_document, FormatError, ParsedDocument, DELIMITER, TIMESTAMP_COLUMN};
