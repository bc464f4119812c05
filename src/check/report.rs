//! Per-file validation report.
//!
//! A report lists the checked sections in order. Each section carries a
//! pass/fail flag and its diagnostics; the status code is one character per
//! section, `0` for pass and `1` for fail.

use crate::models::FileRecordType;
use serde::Serialize;
use std::fmt;

/// Checked parts of a file, in report order for each type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// RAW/CP header line 1
    ProtocolLine,
    /// RAW/CP header line 2
    StationLine,
    /// Column names of the table (or CAL header lines)
    ColumnHeader,
    /// Record numbering and timestamps of the table
    DataBody,
    /// CAL timestamp and method lines
    CalibrationLines,
    /// CAL data lines
    DefinitionGroup,
}

impl Section {
    pub fn label(&self) -> &'static str {
        match self {
            Section::ProtocolLine => "protocol line",
            Section::StationLine => "station line",
            Section::ColumnHeader => "column header",
            Section::DataBody => "data body",
            Section::CalibrationLines => "calibration lines",
            Section::DefinitionGroup => "definition group",
        }
    }

    /// Sections reported for each file type
    pub fn for_type(kind: FileRecordType) -> &'static [Section] {
        match kind {
            FileRecordType::Raw | FileRecordType::Cp => &[
                Section::ProtocolLine,
                Section::StationLine,
                Section::ColumnHeader,
                Section::DataBody,
            ],
            FileRecordType::Sta => &[Section::ColumnHeader, Section::DataBody],
            FileRecordType::Cal => &[
                Section::CalibrationLines,
                Section::ColumnHeader,
                Section::DefinitionGroup,
            ],
        }
    }
}

/// Outcome of one section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionReport {
    pub section: Section,
    pub failed: bool,
    pub messages: Vec<String>,
}

impl SectionReport {
    pub fn new(section: Section) -> Self {
        Self {
            section,
            failed: false,
            messages: Vec::new(),
        }
    }

    /// Record a violated rule
    pub fn fail(&mut self, message: impl Into<String>) {
        self.failed = true;
        self.messages.push(message.into());
    }

    pub fn passed(&self) -> bool {
        !self.failed
    }
}

/// Final result of checking one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    file: String,
    record_type: FileRecordType,
    status: String,
    sections: Vec<SectionReport>,
}

impl ValidationReport {
    /// Pack section outcomes into a report
    pub fn encode(
        file: impl Into<String>,
        record_type: FileRecordType,
        sections: Vec<SectionReport>,
    ) -> Self {
        let status = sections
            .iter()
            .map(|s| if s.failed { '1' } else { '0' })
            .collect();

        Self {
            file: file.into(),
            record_type,
            status,
            sections,
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn record_type(&self) -> FileRecordType {
        self.record_type
    }

    /// One digit per section, `0` = pass, `1` = fail
    pub fn status_code(&self) -> &str {
        &self.status
    }

    pub fn passed(&self) -> bool {
        self.sections.iter().all(SectionReport::passed)
    }

    pub fn sections(&self) -> &[SectionReport] {
        &self.sections
    }

    pub fn section(&self, section: Section) -> Option<&SectionReport> {
        self.sections.iter().find(|s| s.section == section)
    }

    /// Diagnostics of every section, in section order
    pub fn messages(&self) -> Vec<&[String]> {
        self.sections.iter().map(|s| s.messages.as_slice()).collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.file, self.record_type, self.status)?;
        for section in self.sections.iter().filter(|s| s.failed) {
            for message in &section.messages {
                write!(f, "\n    {}: {}", section.section.label(), message)?;
            }
        }
        Ok(())
    }
}
