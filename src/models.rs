//! Core data structures and types for MWR processing.
//!
//! Defines the four file record types, the file naming convention that
//! identifies them, and the statistics reported by a batch run.

use crate::constants::{FILE_NAME_DELIMITER, FILE_NAME_MIN_FIELDS, FILE_NAME_STATION_INDEX};
use crate::error::{MwrError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Record types produced by a radiometer station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileRecordType {
    /// Raw per-channel measurements
    Raw,
    /// Derived meteorological products
    Cp,
    /// Device status snapshots
    Sta,
    /// Calibration logs
    Cal,
}

impl FileRecordType {
    pub const ALL: [FileRecordType; 4] = [Self::Raw, Self::Cp, Self::Sta, Self::Cal];

    /// Token used for this type in file names
    pub fn token(&self) -> &'static str {
        match self {
            FileRecordType::Raw => "RAW",
            FileRecordType::Cp => "CP",
            FileRecordType::Sta => "STA",
            FileRecordType::Cal => "CAL",
        }
    }

    /// Key of this type's column schema in the `heads` config table
    pub fn config_key(&self) -> &'static str {
        match self {
            FileRecordType::Raw => "raw",
            FileRecordType::Cp => "cp",
            FileRecordType::Sta => "sta",
            FileRecordType::Cal => "cal",
        }
    }
}

impl fmt::Display for FileRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for FileRecordType {
    type Err = MwrError;

    fn from_str(s: &str) -> Result<Self> {
        FileRecordType::ALL
            .into_iter()
            .find(|kind| kind.token() == s)
            .ok_or_else(|| MwrError::file_name(s, "unknown record type token"))
    }
}

/// Fields recovered from a data file name
///
/// Names are underscore-delimited, e.g.
/// `Z_UPAR_I_54511_20240101000000_O_YCCMWR_MP3000A_RAW_D.txt`: the station id
/// is the fourth field, the device model and record type are the third- and
/// second-to-last fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileName {
    /// Full file name including extension
    pub file_name: String,
    pub station_id: String,
    pub device_model: String,
    pub record_type: FileRecordType,
}

impl FileName {
    /// Parse a bare file name (no directory part)
    pub fn parse(file_name: &str) -> Result<Self> {
        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| MwrError::file_name(file_name, "no file stem"))?;

        let fields: Vec<&str> = stem.split(FILE_NAME_DELIMITER).collect();
        if fields.len() < FILE_NAME_MIN_FIELDS {
            return Err(MwrError::file_name(
                file_name,
                format!(
                    "expected at least {} fields, found {}",
                    FILE_NAME_MIN_FIELDS,
                    fields.len()
                ),
            ));
        }

        let record_type = fields[fields.len() - 2]
            .parse::<FileRecordType>()
            .map_err(|_| {
                MwrError::file_name(
                    file_name,
                    format!("unknown record type '{}'", fields[fields.len() - 2]),
                )
            })?;

        Ok(Self {
            file_name: file_name.to_string(),
            station_id: fields[FILE_NAME_STATION_INDEX].to_string(),
            device_model: fields[fields.len() - 3].to_string(),
            record_type,
        })
    }

    /// Parse the file name component of a path
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| MwrError::file_name(path.display().to_string(), "not valid UTF-8"))?;
        Self::parse(name)
    }
}

/// Processing statistics for a batch run
#[derive(Debug, Default, Clone, Serialize)]
pub struct ProcessingStats {
    pub files_processed: usize,
    /// Files whose checks all passed (check runs only)
    pub files_passed: usize,
    /// Files with at least one failing section (check runs only)
    pub files_flagged: usize,
    /// Files that could not be processed at all
    pub files_failed: usize,
    /// Files skipped because their name could not be parsed
    pub files_skipped: usize,
    pub processing_time_ms: u128,
}

impl ProcessingStats {
    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }
}
