//! Record numbering and timestamp checks.

use super::report::SectionReport;
use crate::constants::timestamps::{FORMAT, MAX_GAP_SECONDS, PATTERN};
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;

static TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PATTERN).expect("valid timestamp pattern"));

/// Check that record numbers read 1, 2, 3, ... top to bottom
///
/// Stops at the first break; later rows are not examined.
pub fn check_record_sequence<'a, I>(records: I, section: &mut SectionReport)
where
    I: IntoIterator<Item = &'a str>,
{
    for (i, value) in records.into_iter().enumerate() {
        let expected = i as u64 + 1;
        if value.trim().parse::<u64>().ok() != Some(expected) {
            section.fail(format!(
                "Record is not contiguous from 1: row {} has '{}', expected {}",
                i + 1,
                value,
                expected
            ));
            break;
        }
    }
}

/// Check every timestamp against `YYYY-MM-DD HH:MM:SS`, reporting once
///
/// The value must also be a real calendar time with nothing after it.
pub fn check_timestamp_format<'a, I>(times: I, section: &mut SectionReport)
where
    I: IntoIterator<Item = &'a str>,
{
    if let Some((i, value)) = times
        .into_iter()
        .enumerate()
        .find(|(_, t)| !TIMESTAMP.is_match(t) || parse_timestamp(t).is_none())
    {
        section.fail(format!(
            "DateTime format error, first at row {}: '{}'",
            i + 1,
            value
        ));
    }
}

/// Parse a timestamp field
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), FORMAT).ok()
}

/// A timestamp with the position used to report it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedEntry<'a> {
    pub position: usize,
    pub time: &'a str,
}

/// Check gaps between consecutive timestamps
///
/// A gap over two minutes or a step backwards is an interval anomaly; a zero
/// gap is a duplicate. Each kind is reported for its first occurrence only,
/// at the position of the later entry, and scanning stops once both have
/// been seen. Entries whose time does not parse are skipped, and the next
/// parseable entry is compared with the last parseable one before them.
pub fn check_intervals(entries: &[TimedEntry<'_>], unit: &str, section: &mut SectionReport) {
    let mut gap_reported = false;
    let mut duplicate_reported = false;
    let mut previous: Option<NaiveDateTime> = None;

    for entry in entries {
        let Some(current) = parse_timestamp(entry.time) else {
            continue;
        };
        let Some(earlier) = previous.replace(current) else {
            continue;
        };

        let elapsed = (current - earlier).num_seconds();
        if elapsed > MAX_GAP_SECONDS || elapsed < 0 {
            if !gap_reported {
                gap_reported = true;
                section.fail(format!("interval anomaly at {} {}", unit, entry.position));
            }
        } else if elapsed == 0 && !duplicate_reported {
            duplicate_reported = true;
            section.fail(format!("duplicate timestamp at {} {}", unit, entry.position));
        }

        if gap_reported && duplicate_reported {
            break;
        }
    }
}

/// Entries for a table where every row is its own timestamp
pub fn every_row<'a, I>(times: I) -> Vec<TimedEntry<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    times
        .into_iter()
        .enumerate()
        .map(|(i, time)| TimedEntry {
            position: i + 1,
            time,
        })
        .collect()
}

/// Entries for a table where each timestamp spans `group` physical rows
///
/// Keeps the first row of every group; positions stay 1-based physical rows.
pub fn grouped_rows<'a, I>(times: I, group: usize) -> Vec<TimedEntry<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    every_row(times)
        .into_iter()
        .step_by(group.max(1))
        .collect()
}
