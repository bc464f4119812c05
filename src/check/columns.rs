//! Column name checks against the schema registry.

use super::report::SectionReport;
use crate::constants::columns::CP_LAYER_SUFFIX;
use crate::schema::{ColumnSchema, CountKind, SegmentRule};

/// Count declared on the station header line for the variable segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredCount {
    pub kind: CountKind,
    pub count: usize,
}

/// Compare a table's column names with the expected schema
///
/// Fixed columns are compared by position and reported by the name actually
/// found. The variable segment sits between the leading and trailing fixed
/// columns (or runs to the end when there is no trailing column); its length
/// is checked against `declared` when the schema counts it.
pub fn check_columns(
    schema: &ColumnSchema,
    actual: &[String],
    declared: Option<DeclaredCount>,
    section: &mut SectionReport,
) {
    let lead = schema.leading.len();

    for (i, expected) in schema.leading.iter().enumerate() {
        match actual.get(i) {
            Some(found) if found != expected => {
                section.fail(format!("unexpected column '{}'", found));
            }
            Some(_) => {}
            None => section.fail(format!("missing column '{}'", expected)),
        }
    }

    let segment_end = if schema.trailing.is_some() {
        actual.len().saturating_sub(1)
    } else {
        actual.len()
    };
    let segment = actual.get(lead..segment_end).unwrap_or_default();

    if let Some(variable) = &schema.variable {
        if variable.counted {
            if let Some(declared) = declared {
                if segment.len() != declared.count {
                    section.fail(format!(
                        "{} mismatch: header declares {}, table has {}",
                        declared.kind,
                        declared.count,
                        segment.len()
                    ));
                }
            }
        }

        match variable.rule {
            SegmentRule::Prefix(_) => {
                for name in segment.iter().filter(|n| !variable.rule.accepts(n)) {
                    section.fail(format!("unexpected column '{}'", name));
                }
            }
            SegmentRule::Suffix(_) => {
                if let Some(name) = segment.iter().find(|n| !variable.rule.accepts(n)) {
                    section.fail(format!(
                        "layer column '{}' does not carry the unit suffix {}",
                        name, CP_LAYER_SUFFIX
                    ));
                }
            }
        }
    }

    if let Some(trailing) = &schema.trailing {
        match actual.last() {
            Some(found) if found != trailing => {
                section.fail(format!("unexpected column '{}'", found));
            }
            Some(_) => {}
            None => section.fail(format!("missing column '{}'", trailing)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::report::Section;
    use crate::config::Config;
    use crate::models::FileRecordType;
    use crate::schema::SchemaRegistry;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn small_registry() -> SchemaRegistry {
        let mut config = Config::default();
        config.heads.raw = names(&["Record", "DateTime", "QCFlag_BT"]);
        config.heads.cp = names(&["Record", "DateTime", "CloudBase(km)", "QCFlag"]);
        config.heads.sta = names(&["Record", "DateTime", "Power"]);
        config.heads.cal = names(&["Record", "CalParaType"]);
        SchemaRegistry::from_config(&config).unwrap()
    }

    fn channels(n: usize) -> DeclaredCount {
        DeclaredCount {
            kind: CountKind::Channels,
            count: n,
        }
    }

    fn run(kind: FileRecordType, actual: &[&str], declared: Option<DeclaredCount>) -> SectionReport {
        let registry = small_registry();
        let mut section = SectionReport::new(Section::ColumnHeader);
        check_columns(registry.columns(kind), &names(actual), declared, &mut section);
        section
    }

    #[test]
    fn test_raw_columns_pass() {
        let section = run(
            FileRecordType::Raw,
            &["Record", "DateTime", "Ch22.240", "Ch23.040", "QCFlag_BT"],
            Some(channels(2)),
        );
        assert!(section.passed(), "{:?}", section.messages);
    }

    #[test]
    fn test_fixed_mismatch_reports_actual_name() {
        let section = run(
            FileRecordType::Raw,
            &["Record", "Time", "Ch22.240", "QC"],
            Some(channels(1)),
        );
        assert_eq!(
            section.messages,
            vec!["unexpected column 'Time'", "unexpected column 'QC'"]
        );
    }

    #[test]
    fn test_channel_count_mismatch() {
        let section = run(
            FileRecordType::Raw,
            &["Record", "DateTime", "Ch22.240", "QCFlag_BT"],
            Some(channels(14)),
        );
        assert_eq!(section.messages.len(), 1);
        assert!(section.messages[0].contains("channel count mismatch"));
    }

    #[test]
    fn test_every_bad_channel_name_reported() {
        let section = run(
            FileRecordType::Raw,
            &["Record", "DateTime", "22.240", "Ch23.040", "31.400", "QCFlag_BT"],
            Some(channels(3)),
        );
        assert_eq!(
            section.messages,
            vec!["unexpected column '22.240'", "unexpected column '31.400'"]
        );
    }

    #[test]
    fn test_cp_layer_suffix_reported_once() {
        let section = run(
            FileRecordType::Cp,
            &["Record", "DateTime", "CloudBase(km)", "0.000", "0.025", "QCFlag"],
            Some(DeclaredCount {
                kind: CountKind::Layers,
                count: 2,
            }),
        );
        assert_eq!(section.messages.len(), 1);
        assert!(section.messages[0].contains("'0.000'"));
    }

    #[test]
    fn test_sta_missing_columns() {
        let section = run(FileRecordType::Sta, &["Record", "DateTime"], None);
        assert_eq!(section.messages, vec!["missing column 'Power'"]);
    }

    #[test]
    fn test_cal_header_channels_need_space() {
        let section = run(
            FileRecordType::Cal,
            &["Record", "CalParaType", "Ch 22.240", "Ch23.040"],
            None,
        );
        assert_eq!(section.messages, vec!["unexpected column 'Ch23.040'"]);
    }
}
