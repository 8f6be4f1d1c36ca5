//! Result decoding for engine replies.
//!
//! The engine answers with zero or more lines. Data lines look like
//! `(value, value, ...)`; everything else (banners, `Error: ...` text) is
//! not row data. Decoding is best-effort: a malformed row is logged and
//! dropped, never surfaced, and never stops the remaining lines.

mod tuple;
mod value;

pub use tuple::{parse_tuple, RowParseError};
pub use value::{format_row, Row, Value};

use tracing::warn;

/// The end-of-response sentinel as it may linger in decoded text.
pub const TERMINATOR_CHAR: char = '\0';

/// A row-shaped line together with what parsing it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLine {
    /// The trimmed line as received.
    pub line: String,
    /// The parsed row, or why it was dropped.
    pub outcome: std::result::Result<Row, RowParseError>,
}

/// Removes every terminator byte from response text.
pub fn strip_terminators(raw: &str) -> String {
    raw.replace(TERMINATOR_CHAR, "")
}

/// Returns true if a trimmed line has the shape of a data row.
pub fn is_row_line(line: &str) -> bool {
    line.starts_with('(') && line.ends_with(')')
}

/// Parses every row-shaped line and reports the outcome of each.
pub fn decode_lines(raw: &str) -> Vec<DecodedLine> {
    let clean = strip_terminators(raw);
    clean
        .lines()
        .map(str::trim)
        .filter(|line| is_row_line(line))
        .map(|line| DecodedLine {
            line: line.to_string(),
            outcome: parse_tuple(line),
        })
        .collect()
}

/// Decodes response text into rows, in line order.
///
/// Non-row lines are ignored. Row-shaped lines that fail to parse are
/// logged at `warn` and skipped.
pub fn decode(raw: &str) -> Vec<Row> {
    decode_lines(raw)
        .into_iter()
        .filter_map(|decoded| match decoded.outcome {
            Ok(row) => Some(row),
            Err(e) => {
                warn!("Dropping malformed row {:?}: {}", decoded.line, e);
                None
            }
        })
        .collect()
}

/// Counts lines that look like rows, without parsing them.
pub fn count_rows(raw: &str) -> usize {
    strip_terminators(raw)
        .lines()
        .filter(|line| is_row_line(line.trim()))
        .count()
}

/// Returns the first line carrying engine-reported error text, if any.
pub fn engine_error(raw: &str) -> Option<String> {
    strip_terminators(raw)
        .lines()
        .map(str::trim)
        .find(|line| !is_row_line(line) && line.contains("Error"))
        .map(String::from)
}
