//! Integration tests for the format checker on fixture files
//!
//! The fixtures under `tests/fixtures/` are well-formed files of each type
//! laid out against the built-in column schemas. Broken variants are derived
//! from them in a temporary directory.

use mwr_processor::{BatchProcessor, Config, FileOutcome, FormatChecker, MwrError, Section};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const RAW_NAME: &str = "Z_UPAR_I_54511_20240101000000_O_YCCMWR_MP3000A_RAW_D.txt";
const CP_NAME: &str = "Z_UPAR_I_54511_20240101000000_P_YCCMWR_MP3000A_CP_D.txt";
const STA_NAME: &str = "Z_UPAR_I_54511_20240101000000_O_YCCMWR_MP3000A_STA_D.txt";
const CAL_NAME: &str = "Z_UPAR_I_54511_20240301000000_O_YCCMWR_MP3000A_CAL_M.txt";

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn fixture(name: &str) -> String {
    fs::read_to_string(fixtures_dir().join(name)).expect("fixture exists")
}

fn checker() -> FormatChecker {
    let config = Config::default();
    FormatChecker::new(Arc::new(config.schema_registry().unwrap()))
}

/// Write `content` under `name` in a fresh directory and check it
fn check_variant(name: &str, content: &str) -> mwr_processor::Result<mwr_processor::ValidationReport> {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(name);
    fs::write(&path, content).unwrap();
    checker().check_file(&path)
}

#[test]
fn test_fixtures_pass_every_section() {
    let checker = checker();
    for (name, expected) in [
        (RAW_NAME, "0000"),
        (CP_NAME, "0000"),
        (STA_NAME, "00"),
        (CAL_NAME, "000"),
    ] {
        let report = checker.check_file(&fixtures_dir().join(name)).unwrap();
        assert_eq!(report.status_code(), expected, "{}", report);
        assert!(report.messages().iter().all(|m| m.is_empty()));
    }
}

#[test]
fn test_raw_header_problems() {
    let content = fixture(RAW_NAME)
        .replacen("MWR,01.00", "MWR,1.00", 1)
        .replacen("116.4700", "116.47", 1)
        .replacen("MP3000A,3", "MP3000A,5", 1);
    let report = check_variant(RAW_NAME, &content).unwrap();

    assert_eq!(report.status_code(), "1110");
    let station = report.section(Section::StationLine).unwrap();
    assert_eq!(station.messages.len(), 1);
    assert!(station.messages[0].contains("longitude"));
    let columns = report.section(Section::ColumnHeader).unwrap();
    assert_eq!(
        columns.messages,
        vec!["channel count mismatch: header declares 5, table has 3"]
    );
}

#[test]
fn test_raw_channel_name_without_prefix() {
    let content = fixture(RAW_NAME).replacen(",Ch23.040,", ",23.040,", 1);
    let report = check_variant(RAW_NAME, &content).unwrap();
    assert_eq!(report.status_code(), "0010");
    assert_eq!(
        report.section(Section::ColumnHeader).unwrap().messages,
        vec!["unexpected column '23.040'"]
    );
}

#[test]
fn test_raw_body_problems() {
    let content = fixture(RAW_NAME)
        .replacen("\n3,2024-01-01 00:02:00", "\n4,2024-01-01 00:01:00", 1)
        .replacen("\n4,2024-01-01 00:03:00", "\n5,2024-01-01 00:09:00", 1);
    let report = check_variant(RAW_NAME, &content).unwrap();

    assert_eq!(report.status_code(), "0001");
    assert_eq!(
        report.section(Section::DataBody).unwrap().messages,
        vec![
            "Record is not contiguous from 1: row 3 has '4', expected 3",
            "duplicate timestamp at row 3",
            "interval anomaly at row 4",
        ]
    );
}

#[test]
fn test_raw_impossible_date_is_reported() {
    let content = fixture(RAW_NAME).replacen("2024-01-01 00:02:00", "2024-02-30 00:02:00", 1);
    let report = check_variant(RAW_NAME, &content).unwrap();

    assert_eq!(report.status_code(), "0001");
    assert_eq!(
        report.section(Section::DataBody).unwrap().messages,
        vec!["DateTime format error, first at row 3: '2024-02-30 00:02:00'"]
    );
}

#[test]
fn test_raw_exponent_channel_count() {
    let content = fixture(RAW_NAME).replacen("MP3000A,3", "MP3000A,3e0", 1);
    let report = check_variant(RAW_NAME, &content).unwrap();

    assert_eq!(report.status_code(), "0100");
    assert_eq!(
        report.section(Section::StationLine).unwrap().messages,
        vec!["channel count '3e0' is not a positive integer"]
    );
}

#[test]
fn test_cp_device_model_mismatch() {
    let content = fixture(CP_NAME).replacen("MP3000A", "HTG-4", 1);
    let report = check_variant(CP_NAME, &content).unwrap();
    assert_eq!(report.status_code(), "0100");
}

#[test]
fn test_cp_gap_between_timestamp_groups() {
    let content = fixture(CP_NAME).replace("2024-01-01 00:01:00", "2024-01-01 00:02:30");
    let report = check_variant(CP_NAME, &content).unwrap();
    assert_eq!(
        report.section(Section::DataBody).unwrap().messages,
        vec!["interval anomaly at row 5"]
    );
}

#[test]
fn test_cal_problems_land_in_their_sections() {
    let content = fixture(CAL_NAME)
        .replacen("NOISE", "MANUAL", 1)
        .replacen("3,Gain", "3,Bogus", 1);
    let report = check_variant(CAL_NAME, &content).unwrap();

    assert_eq!(report.status_code(), "101");
    assert!(report.section(Section::CalibrationLines).unwrap().messages[0].contains("'MANUAL'"));
    assert_eq!(
        report.section(Section::DefinitionGroup).unwrap().messages,
        vec!["calibration parameter type 'Bogus' is not recognised"]
    );
}

#[test]
fn test_short_station_line_is_structural() {
    let content = fixture(RAW_NAME).replacen(",MP3000A,3", "", 1);
    assert!(matches!(
        check_variant(RAW_NAME, &content),
        Err(MwrError::Structural { .. })
    ));
}

#[test]
fn test_ragged_table_is_structural() {
    let content = format!("{}5,2024-01-01 00:04:00\n", fixture(STA_NAME));
    assert!(matches!(
        check_variant(STA_NAME, &content),
        Err(MwrError::Structural { .. })
    ));
}

#[tokio::test]
async fn test_batch_over_fixture_directory() {
    let output = TempDir::new().unwrap();
    let config = Config::default()
        .with_input_dir(fixtures_dir())
        .with_output_dir(output.path().to_path_buf())
        .with_workers(2);

    let result = BatchProcessor::new(Arc::new(config))
        .unwrap()
        .check_all()
        .await
        .unwrap();

    assert_eq!(result.stats.files_processed, 4);
    assert_eq!(result.stats.files_passed, 4);
    assert!(!result.stats.has_failures());
    assert!(
        result
            .outcomes
            .iter()
            .all(|o| matches!(o, FileOutcome::Checked { .. }))
    );
}
