//! Normalization of MWR files into their canonical form.
//!
//! Runs independently of the checker: a file does not need to pass
//! validation to be normalized. RAW and CP files get canonical header lines,
//! renumbered records and fixed column precision. CAL files only have their
//! data line record numbers rewritten. STA files are copied unchanged.

use crate::calibration::{LineKind, classify};
use crate::config::Config;
use crate::constants::{FIELD_DELIMITER, columns, precision};
use crate::error::{MwrError, Result};
use crate::header::HeaderBlock;
use crate::models::{FileName, FileRecordType};
use crate::numeric::format_fixed;
use crate::table::DataTable;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::debug;

/// Rewrites files into the configured output directory
#[derive(Debug, Clone)]
pub struct Normalizer {
    config: Arc<Config>,
}

impl Normalizer {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Normalize one file and return the path written
    ///
    /// The output keeps the input's file name. It is written to a temporary
    /// file in the output directory first and only moved into place once
    /// complete, so a failed file leaves nothing behind.
    pub fn transform_file(&self, path: &Path) -> Result<PathBuf> {
        let name = FileName::from_path(path)?;
        let output_dir = &self.config.output_dir;

        fs::create_dir_all(output_dir).map_err(|e| MwrError::OutputNotWritable {
            path: output_dir.clone(),
            reason: e.to_string(),
        })?;

        let output_path = output_dir.join(&name.file_name);
        let input = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => MwrError::InputNotFound {
                path: path.to_path_buf(),
            },
            _ => MwrError::Io(e),
        })?;

        let input_path = fs::canonicalize(path)?;
        if input_path.parent() == Some(fs::canonicalize(output_dir)?.as_path()) {
            return Err(MwrError::OutputNotWritable {
                path: output_path,
                reason: "output would overwrite the input file".to_string(),
            });
        }

        let mut temp = NamedTempFile::new_in(output_dir).map_err(|e| MwrError::OutputNotWritable {
            path: output_dir.clone(),
            reason: e.to_string(),
        })?;

        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            self.transform_reader(&name, BufReader::new(input), &mut writer, path)?;
            writer.flush()?;
        }

        temp.persist(&output_path)
            .map_err(|e| MwrError::OutputNotWritable {
                path: output_path.clone(),
                reason: e.error.to_string(),
            })?;

        debug!("Wrote {}", output_path.display());
        Ok(output_path)
    }

    /// Normalize content read from `reader` into `writer`
    pub fn transform_reader<R: BufRead, W: Write>(
        &self,
        name: &FileName,
        reader: R,
        mut writer: W,
        path: &Path,
    ) -> Result<()> {
        match name.record_type {
            FileRecordType::Raw | FileRecordType::Cp => {
                self.normalize_station_file(name, reader, writer, path)
            }
            FileRecordType::Cal => {
                let renumbered = normalize_calibration(reader, writer)?;
                debug!("Renumbered {} calibration data lines", renumbered);
                Ok(())
            }
            FileRecordType::Sta => {
                let mut reader = reader;
                std::io::copy(&mut reader, &mut writer)?;
                Ok(())
            }
        }
    }

    /// Rewrite the header lines and table of a RAW or CP file
    pub fn normalize_station_file<R: BufRead, W: Write>(
        &self,
        name: &FileName,
        mut reader: R,
        mut writer: W,
        path: &Path,
    ) -> Result<()> {
        let mut header = HeaderBlock::read_from(&mut reader, path)?;
        header.normalize(&name.station_id, path)?;

        let mut table = DataTable::read_from(reader, path)?;
        let record = table.require_column(columns::RECORD, path)?;
        table.update_column(record, |row, _| Ok(row.to_string()))?;

        let rules = &self.config.normalize;
        let (two_decimal, three_decimal) = match name.record_type {
            FileRecordType::Raw => {
                let flag = table.require_column(columns::QC_FLAG_BT, path)?;
                table.update_column(flag, |_, _| Ok(columns::QC_FLAG_BT_CLEAR.to_string()))?;

                let mut three = required_columns(&table, &rules.raw_three_decimal, path)?;
                three.extend(matching_columns(&table, |c| {
                    c.starts_with(columns::RAW_CHANNEL_PREFIX)
                }));
                (required_columns(&table, &rules.raw_two_decimal, path)?, three)
            }
            _ => {
                let three = matching_columns(&table, |c| {
                    c.ends_with(columns::CP_LAYER_SUFFIX) && c != rules.cp_layer_exception
                });
                (required_columns(&table, &rules.cp_two_decimal, path)?, three)
            }
        };

        for index in two_decimal {
            fix_precision(&mut table, index, precision::TWO, path)?;
        }
        for index in three_decimal {
            fix_precision(&mut table, index, precision::THREE, path)?;
        }

        writer.write_all(header.to_lines().as_bytes())?;
        table.write_to(&mut writer)?;
        Ok(())
    }
}

/// Renumber CAL data lines 1..N, copying every other byte unchanged
///
/// Returns the number of data lines rewritten.
pub fn normalize_calibration<R: BufRead, W: Write>(mut reader: R, mut writer: W) -> Result<usize> {
    let mut record = 0;
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }

        let content = line.trim_end_matches(['\r', '\n']);
        if classify(content) == LineKind::Data {
            if let Some((_, rest)) = line.split_once(FIELD_DELIMITER) {
                record += 1;
                write!(writer, "{}{}{}", record, FIELD_DELIMITER, rest)?;
                continue;
            }
        }
        writer.write_all(line.as_bytes())?;
    }

    writer.flush()?;
    Ok(record)
}

fn required_columns(table: &DataTable, names: &[String], path: &Path) -> Result<Vec<usize>> {
    names
        .iter()
        .map(|name| table.require_column(name, path))
        .collect()
}

fn matching_columns<F>(table: &DataTable, predicate: F) -> Vec<usize>
where
    F: Fn(&str) -> bool,
{
    table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, name)| predicate(name))
        .map(|(i, _)| i)
        .collect()
}

fn fix_precision(table: &mut DataTable, index: usize, places: usize, path: &Path) -> Result<()> {
    let column = table.columns()[index].clone();
    table.update_column(index, |row, cell| {
        if cell.trim().is_empty() {
            return Ok(cell.to_string());
        }
        format_fixed(cell, places).map_err(|e| {
            MwrError::structural(path, format!("column '{}' row {}: {}", column, row, e))
        })
    })
}
