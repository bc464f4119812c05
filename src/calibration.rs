//! Line classification for CAL files.
//!
//! A calibration log has no single table shape. Each line is one of: a
//! timestamp line (`2024-01-01 08:00:00,ABSOLUTE`), a column header line
//! starting with `Record`, or a data line starting with a record number.
//! Lines are classified one at a time and collected into per-kind buckets.

use crate::constants::{FIELD_DELIMITER, calibration, timestamps};
use regex::Regex;
use std::sync::LazyLock;

static TIMESTAMP_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(timestamps::PATTERN).expect("valid timestamp pattern"));

static DATA_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(calibration::DATA_LINE_PATTERN).expect("valid data line pattern"));

/// Kind of a single CAL line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Timestamp,
    Header,
    Data,
    Unrecognized,
}

/// Classify one line (without its line terminator)
pub fn classify(line: &str) -> LineKind {
    if TIMESTAMP_LINE.is_match(line) {
        LineKind::Timestamp
    } else if line.starts_with(calibration::HEADER_PREFIX) {
        LineKind::Header
    } else if DATA_LINE.is_match(line) {
        LineKind::Data
    } else {
        LineKind::Unrecognized
    }
}

/// A timestamp line split into its time and calibration method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampEntry {
    pub time: String,
    /// Empty when the line has no second field
    pub method: String,
}

/// A data line's record number and parameter type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataEntry {
    pub record: String,
    /// Empty when the line has no second field
    pub parameter_type: String,
}

/// CAL file content bucketed by line kind
///
/// Order is preserved within each bucket; order across buckets is not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalibrationLog {
    pub timestamp_lines: Vec<String>,
    pub header_lines: Vec<String>,
    pub data_lines: Vec<String>,
    pub unrecognized: Vec<String>,
}

impl CalibrationLog {
    pub fn from_text(text: &str) -> Self {
        let mut log = Self::default();
        for line in text.lines() {
            let bucket = match classify(line) {
                LineKind::Timestamp => &mut log.timestamp_lines,
                LineKind::Header => &mut log.header_lines,
                LineKind::Data => &mut log.data_lines,
                LineKind::Unrecognized => &mut log.unrecognized,
            };
            bucket.push(line.to_string());
        }
        log
    }

    pub fn timestamp_entries(&self) -> Vec<TimestampEntry> {
        self.timestamp_lines
            .iter()
            .map(|line| {
                let (time, method) = first_two_fields(line);
                TimestampEntry { time, method }
            })
            .collect()
    }

    pub fn data_entries(&self) -> Vec<DataEntry> {
        self.data_lines
            .iter()
            .map(|line| {
                let (record, parameter_type) = first_two_fields(line);
                DataEntry {
                    record,
                    parameter_type,
                }
            })
            .collect()
    }

    /// Fields of each header line
    pub fn header_fields(&self) -> Vec<Vec<String>> {
        self.header_lines
            .iter()
            .map(|line| line.trim().split(FIELD_DELIMITER).map(str::to_string).collect())
            .collect()
    }
}

fn first_two_fields(line: &str) -> (String, String) {
    let mut fields = line.trim().split(FIELD_DELIMITER);
    let first = fields.next().unwrap_or_default().to_string();
    let second = fields.next().unwrap_or_default().to_string();
    (first, second)
}
