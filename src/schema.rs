//! Schema registry for the four MWR file types.
//!
//! Holds, per file type, the expected column layout of the table and the
//! meaning of the counts declared on the station header line. Built once from
//! the validated [`Config`] and never modified afterwards.

use crate::config::Config;
use crate::constants::columns;
use crate::error::Result;
use crate::models::FileRecordType;
use std::fmt;

/// Naming rule for the columns of a variable-length segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentRule {
    /// Every name must start with the prefix; each offender is reported
    Prefix(&'static str),
    /// Every name must end with the suffix; reported once
    Suffix(&'static str),
}

impl SegmentRule {
    pub fn accepts(&self, name: &str) -> bool {
        match self {
            SegmentRule::Prefix(prefix) => name.starts_with(prefix),
            SegmentRule::Suffix(suffix) => name.ends_with(suffix),
        }
    }
}

/// Variable-length run of columns between the fixed ones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSegment {
    pub rule: SegmentRule,
    /// Whether the segment length must equal the count declared in the header
    pub counted: bool,
}

/// Expected column layout of one file type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub kind: FileRecordType,
    /// Fixed names at the start of the table, compared positionally
    pub leading: Vec<String>,
    pub variable: Option<VariableSegment>,
    /// Fixed last name, when the layout has one
    pub trailing: Option<String>,
}

impl ColumnSchema {
    fn build(kind: FileRecordType, heads: &[String]) -> Self {
        match kind {
            FileRecordType::Raw | FileRecordType::Cp => {
                let (last, leading) = heads
                    .split_last()
                    .map(|(last, rest)| (Some(last.clone()), rest.to_vec()))
                    .unwrap_or((None, Vec::new()));
                let rule = if kind == FileRecordType::Raw {
                    SegmentRule::Prefix(columns::RAW_CHANNEL_PREFIX)
                } else {
                    SegmentRule::Suffix(columns::CP_LAYER_SUFFIX)
                };
                Self {
                    kind,
                    leading,
                    variable: Some(VariableSegment {
                        rule,
                        counted: true,
                    }),
                    trailing: last,
                }
            }
            FileRecordType::Sta => Self {
                kind,
                leading: heads.to_vec(),
                variable: None,
                trailing: None,
            },
            FileRecordType::Cal => Self {
                kind,
                leading: heads.to_vec(),
                variable: Some(VariableSegment {
                    rule: SegmentRule::Prefix(columns::CAL_CHANNEL_PREFIX),
                    counted: false,
                }),
                trailing: None,
            },
        }
    }

    /// Number of fixed columns (leading plus trailing)
    pub fn fixed_len(&self) -> usize {
        self.leading.len() + usize::from(self.trailing.is_some())
    }
}

/// What a count on the station header line counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountKind {
    Channels,
    Layers,
}

impl fmt::Display for CountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountKind::Channels => f.write_str("channel count"),
            CountKind::Layers => f.write_str("layer count"),
        }
    }
}

/// Meaning of the count fields on header line 2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLayout {
    /// Count expected in field 5, sizing the variable column segment
    pub declared: CountKind,
    /// Count that must not appear in field 6 for this file type
    pub forbidden: CountKind,
}

/// Immutable per-type schema lookup
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    raw: ColumnSchema,
    cp: ColumnSchema,
    sta: ColumnSchema,
    cal: ColumnSchema,
}

impl SchemaRegistry {
    /// Build the registry, failing on missing or malformed schema entries
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let heads = &config.heads;

        Ok(Self {
            raw: ColumnSchema::build(FileRecordType::Raw, &heads.raw),
            cp: ColumnSchema::build(FileRecordType::Cp, &heads.cp),
            sta: ColumnSchema::build(FileRecordType::Sta, &heads.sta),
            cal: ColumnSchema::build(FileRecordType::Cal, &heads.cal),
        })
    }

    pub fn columns(&self, kind: FileRecordType) -> &ColumnSchema {
        match kind {
            FileRecordType::Raw => &self.raw,
            FileRecordType::Cp => &self.cp,
            FileRecordType::Sta => &self.sta,
            FileRecordType::Cal => &self.cal,
        }
    }

    /// Header layout for types that carry the two station header lines
    pub fn header_layout(&self, kind: FileRecordType) -> Option<HeaderLayout> {
        match kind {
            FileRecordType::Raw => Some(HeaderLayout {
                declared: CountKind::Channels,
                forbidden: CountKind::Layers,
            }),
            FileRecordType::Cp => Some(HeaderLayout {
                declared: CountKind::Layers,
                forbidden: CountKind::Channels,
            }),
            FileRecordType::Sta | FileRecordType::Cal => None,
        }
    }
}
