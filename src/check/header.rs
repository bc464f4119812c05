//! Header line checks for RAW/CP files and CAL timestamp lines.

use super::body::{TimedEntry, check_intervals, parse_timestamp};
use super::columns::DeclaredCount;
use super::report::SectionReport;
use crate::calibration::TimestampEntry;
use crate::constants::{PROTOCOL_TAG, calibration, header_fields as hf};
use crate::error::{MwrError, Result};
use crate::header::HeaderBlock;
use crate::models::FileRecordType;
use crate::numeric::{decimal_places, integer_digits, parse_number};
use crate::schema::HeaderLayout;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static STATION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(hf::STATION_ID_PATTERN).expect("valid station id pattern"));

/// Check header line 1: protocol tag and `NN.NN` format version
pub fn check_protocol_line(
    header: &HeaderBlock,
    path: &Path,
    section: &mut SectionReport,
) -> Result<()> {
    if header.protocol_tag() != PROTOCOL_TAG {
        section.fail(format!(
            "protocol tag is '{}', expected '{}'",
            header.protocol_tag(),
            PROTOCOL_TAG
        ));
    }

    let version = header.version();
    let places = numeric(decimal_places(version), "format version", path)?;
    let digits = numeric(integer_digits(version), "format version", path)?;
    if places != hf::VERSION_DECIMAL_PLACES || digits != hf::VERSION_INTEGER_DIGITS {
        section.fail(format!(
            "format version '{}' is not {} integer digits and {} decimal places",
            version,
            hf::VERSION_INTEGER_DIGITS,
            hf::VERSION_DECIMAL_PLACES
        ));
    }

    Ok(())
}

/// Check header line 2 and return the count that sizes the variable columns
pub fn check_station_line(
    header: &HeaderBlock,
    kind: FileRecordType,
    device_model: &str,
    layout: HeaderLayout,
    path: &Path,
    section: &mut SectionReport,
) -> Result<DeclaredCount> {
    if !STATION_ID.is_match(header.station_id()) {
        section.fail(format!(
            "station id '{}' is not one letter or digit followed by 4 digits",
            header.station_id()
        ));
    }

    let coordinates = [
        ("longitude", header.longitude(), hf::LONGITUDE_DECIMAL_PLACES),
        ("latitude", header.latitude(), hf::LATITUDE_DECIMAL_PLACES),
    ];
    for (name, value, expected) in coordinates {
        if numeric(decimal_places(value), name, path)? != expected {
            section.fail(format!(
                "{} '{}' does not have {} decimal places",
                name, value, expected
            ));
        }
    }

    if header.device_model() != device_model {
        section.fail(format!(
            "device model '{}' does not match '{}' from the file name",
            header.device_model(),
            device_model
        ));
    }

    let raw_count = header.declared_count();
    numeric(parse_number(raw_count), &layout.declared.to_string(), path)?;
    let mut count = match raw_count.trim().parse::<usize>() {
        Ok(count) if count > 0 => count,
        _ => {
            section.fail(format!(
                "{} '{}' is not a positive integer",
                layout.declared, raw_count
            ));
            0
        }
    };

    if let Some(extra) = header.extra_count() {
        section.fail(format!(
            "{} is not allowed in a {} file",
            layout.forbidden, kind
        ));
        // a CP file carrying the extra field sizes its layers from it
        if kind == FileRecordType::Cp {
            count = extra.trim().parse::<usize>().map_err(|_| {
                MwrError::structural(path, format!("extra count '{}' is not an integer", extra))
            })?;
        }
    }

    Ok(DeclaredCount {
        kind: layout.declared,
        count,
    })
}

/// Check CAL timestamp lines: method vocabulary and spacing between entries
pub fn check_calibration_lines(entries: &[TimestampEntry], section: &mut SectionReport) {
    if let Some(entry) = entries
        .iter()
        .find(|e| !calibration::METHODS.contains(&e.method.as_str()))
    {
        section.fail(format!(
            "calibration method '{}' is not one of {}",
            entry.method,
            calibration::METHODS.join("/")
        ));
    }

    if let Some((i, entry)) = entries
        .iter()
        .enumerate()
        .find(|(_, e)| parse_timestamp(&e.time).is_none())
    {
        section.fail(format!(
            "calibration time '{}' at entry {} is not a valid date and time",
            entry.time,
            i + 1
        ));
    }

    let timed: Vec<TimedEntry<'_>> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| TimedEntry {
            position: i + 1,
            time: &e.time,
        })
        .collect();
    check_intervals(&timed, "entry", section);
}

fn numeric<T>(
    result: std::result::Result<T, crate::error::NumericError>,
    field: &str,
    path: &Path,
) -> Result<T> {
    result.map_err(|e| MwrError::structural(path, format!("header {}: {}", field, e)))
}
