//! Format checking for MWR data files.
//!
//! Each file type is checked section by section. Rule violations are
//! collected as diagnostics in the returned [`ValidationReport`]; only
//! structural problems (unreadable header lines, a table that cannot be
//! parsed, missing `Record`/`DateTime` columns) abort a file with an error.

pub mod body;
pub mod columns;
pub mod header;
pub mod report;

pub use report::{Section, SectionReport, ValidationReport};

use crate::calibration::CalibrationLog;
use crate::constants::{calibration, timestamps::CP_ROWS_PER_TIMESTAMP};
use crate::error::{MwrError, Result};
use crate::header::HeaderBlock;
use crate::models::{FileName, FileRecordType};
use crate::schema::SchemaRegistry;
use crate::table::DataTable;
use body::{check_intervals, check_record_sequence, check_timestamp_format, every_row, grouped_rows};
use columns::check_columns;
use header::{check_calibration_lines, check_protocol_line, check_station_line};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Validates files against the schema registry
#[derive(Debug, Clone)]
pub struct FormatChecker {
    registry: Arc<SchemaRegistry>,
}

impl FormatChecker {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    /// Check one file, taking its type from the file name
    pub fn check_file(&self, path: &Path) -> Result<ValidationReport> {
        let name = FileName::from_path(path)?;
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => MwrError::InputNotFound {
                path: path.to_path_buf(),
            },
            _ => MwrError::Io(e),
        })?;

        debug!("Checking {} as {}", path.display(), name.record_type);
        self.check_reader(&name, BufReader::new(file), path)
    }

    /// Check content already opened by the caller
    pub fn check_reader<R: BufRead>(
        &self,
        name: &FileName,
        reader: R,
        path: &Path,
    ) -> Result<ValidationReport> {
        match name.record_type {
            FileRecordType::Raw => self.raw_check(name, reader, path),
            FileRecordType::Cp => self.cp_check(name, reader, path),
            FileRecordType::Sta => self.sta_check(name, reader, path),
            FileRecordType::Cal => self.cal_check(name, reader, path),
        }
    }

    pub fn raw_check<R: BufRead>(
        &self,
        name: &FileName,
        reader: R,
        path: &Path,
    ) -> Result<ValidationReport> {
        self.station_check(FileRecordType::Raw, name, reader, path)
    }

    pub fn cp_check<R: BufRead>(
        &self,
        name: &FileName,
        reader: R,
        path: &Path,
    ) -> Result<ValidationReport> {
        self.station_check(FileRecordType::Cp, name, reader, path)
    }

    /// STA files have no header lines; sections are column header and data body
    pub fn sta_check<R: BufRead>(
        &self,
        name: &FileName,
        reader: R,
        path: &Path,
    ) -> Result<ValidationReport> {
        let table = DataTable::read_from(reader, path)?;

        let mut columns = SectionReport::new(Section::ColumnHeader);
        check_columns(
            self.registry.columns(FileRecordType::Sta),
            table.columns(),
            None,
            &mut columns,
        );

        let mut body = SectionReport::new(Section::DataBody);
        let accessor = table.accessor(path)?;
        check_record_sequence(table.rows().iter().map(|r| accessor.record(r)), &mut body);
        check_timestamp_format(table.rows().iter().map(|r| accessor.date_time(r)), &mut body);

        Ok(ValidationReport::encode(
            &name.file_name,
            FileRecordType::Sta,
            vec![columns, body],
        ))
    }

    /// CAL sections: calibration lines, column header lines, definition group
    pub fn cal_check<R: BufRead>(
        &self,
        name: &FileName,
        mut reader: R,
        path: &Path,
    ) -> Result<ValidationReport> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        let log = CalibrationLog::from_text(&text);

        for line in &log.unrecognized {
            warn!("Unrecognized line in {}: {:?}", path.display(), line);
        }

        let mut lines = SectionReport::new(Section::CalibrationLines);
        check_calibration_lines(&log.timestamp_entries(), &mut lines);

        let mut columns = SectionReport::new(Section::ColumnHeader);
        let schema = self.registry.columns(FileRecordType::Cal);
        for fields in log.header_fields() {
            check_columns(schema, &fields, None, &mut columns);
        }

        let mut group = SectionReport::new(Section::DefinitionGroup);
        let entries = log.data_entries();
        check_record_sequence(entries.iter().map(|e| e.record.as_str()), &mut group);
        if let Some(entry) = entries
            .iter()
            .find(|e| !calibration::PARAMETER_TYPES.contains(&e.parameter_type.as_str()))
        {
            group.fail(format!(
                "calibration parameter type '{}' is not recognised",
                entry.parameter_type
            ));
        }

        Ok(ValidationReport::encode(
            &name.file_name,
            FileRecordType::Cal,
            vec![lines, columns, group],
        ))
    }

    fn station_check<R: BufRead>(
        &self,
        kind: FileRecordType,
        name: &FileName,
        mut reader: R,
        path: &Path,
    ) -> Result<ValidationReport> {
        let Some(layout) = self.registry.header_layout(kind) else {
            return Err(MwrError::configuration(format!(
                "{} files have no station header layout",
                kind
            )));
        };

        let header = HeaderBlock::read_from(&mut reader, path)?;
        let table = DataTable::read_from(reader, path)?;

        let mut protocol = SectionReport::new(Section::ProtocolLine);
        check_protocol_line(&header, path, &mut protocol)?;

        let mut station = SectionReport::new(Section::StationLine);
        let declared =
            check_station_line(&header, kind, &name.device_model, layout, path, &mut station)?;

        // an invalid declared count is already reported on the station line
        let mut columns = SectionReport::new(Section::ColumnHeader);
        check_columns(
            self.registry.columns(kind),
            table.columns(),
            Some(declared).filter(|d| d.count > 0),
            &mut columns,
        );

        let mut body = SectionReport::new(Section::DataBody);
        let accessor = table.accessor(path)?;
        check_record_sequence(table.rows().iter().map(|r| accessor.record(r)), &mut body);

        let times = table.rows().iter().map(|r| accessor.date_time(r));
        check_timestamp_format(times.clone(), &mut body);
        let entries = match kind {
            FileRecordType::Cp => grouped_rows(times, CP_ROWS_PER_TIMESTAMP),
            _ => every_row(times),
        };
        check_intervals(&entries, "row", &mut body);

        Ok(ValidationReport::encode(
            &name.file_name,
            kind,
            vec![protocol, station, columns, body],
        ))
    }
}
