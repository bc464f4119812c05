//! Tabular body of RAW, CP and STA files.
//!
//! The body is a comma-separated table whose first line names the columns.
//! Cells are kept as the exact text found in the file: the checker needs the
//! original digits, and the normalizer writes untouched columns back as read.

use crate::constants::columns;
use crate::error::{MwrError, Result};
use std::io::{Read, Write};
use std::path::Path;

/// Parsed table: column names plus one row of cells per record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Positions of the columns every table must have, resolved once per file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowAccessor {
    record: usize,
    date_time: usize,
}

impl RowAccessor {
    pub fn record<'a>(&self, row: &'a [String]) -> &'a str {
        &row[self.record]
    }

    pub fn date_time<'a>(&self, row: &'a [String]) -> &'a str {
        &row[self.date_time]
    }
}

impl DataTable {
    /// Parse a table from the remaining content of a reader
    ///
    /// Every row must have as many cells as there are column names.
    pub fn read_from<R: Read>(reader: R, path: &Path) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let columns: Vec<String> = csv_reader
            .headers()
            .map_err(|e| MwrError::structural(path, format!("cannot read column names: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect();

        if columns.is_empty() || columns.iter().all(String::is_empty) {
            return Err(MwrError::structural(path, "table has no column names"));
        }

        let mut rows = Vec::new();
        for (index, result) in csv_reader.records().enumerate() {
            let record = result.map_err(|e| {
                MwrError::structural(path, format!("table row {}: {}", index + 1, e))
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of a column the caller cannot work without
    pub fn require_column(&self, name: &str, path: &Path) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| MwrError::structural(path, format!("table has no '{}' column", name)))
    }

    /// Resolve the `Record` and `DateTime` columns
    pub fn accessor(&self, path: &Path) -> Result<RowAccessor> {
        Ok(RowAccessor {
            record: self.require_column(columns::RECORD, path)?,
            date_time: self.require_column(columns::DATE_TIME, path)?,
        })
    }

    /// Replace every cell of a column with the result of `f(row_number, cell)`
    ///
    /// `row_number` is 1-based.
    pub fn update_column<F>(&mut self, index: usize, mut f: F) -> Result<()>
    where
        F: FnMut(usize, &str) -> Result<String>,
    {
        for (i, row) in self.rows.iter_mut().enumerate() {
            row[index] = f(i + 1, &row[index])?;
        }
        Ok(())
    }

    /// Write column names and rows as comma-separated lines
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);

        csv_writer.write_record(&self.columns)?;
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> &'static Path {
        Path::new("table.csv")
    }

    const BODY: &str = "Record,DateTime,SurTem(℃)\n\
                        1,2024-01-01 00:00:00,21.5\n\
                        2,2024-01-01 00:01:00,21.47\n";

    #[test]
    fn test_read_table() {
        let table = DataTable::read_from(BODY.as_bytes(), path()).unwrap();
        assert_eq!(table.columns(), &["Record", "DateTime", "SurTem(℃)"]);
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[1][2], "21.47");
    }

    #[test]
    fn test_accessor() {
        let table = DataTable::read_from(BODY.as_bytes(), path()).unwrap();
        let accessor = table.accessor(path()).unwrap();
        let row = &table.rows()[0];
        assert_eq!(accessor.record(row), "1");
        assert_eq!(accessor.date_time(row), "2024-01-01 00:00:00");
    }

    #[test]
    fn test_missing_record_column() {
        let table = DataTable::read_from("DateTime,X\n2024-01-01 00:00:00,1\n".as_bytes(), path())
            .unwrap();
        let err = table.accessor(path()).unwrap_err();
        assert!(err.to_string().contains("'Record'"));
    }

    #[test]
    fn test_ragged_row_is_structural() {
        let body = "Record,DateTime\n1,2024-01-01 00:00:00,extra\n";
        assert!(matches!(
            DataTable::read_from(body.as_bytes(), path()),
            Err(MwrError::Structural { .. })
        ));
    }

    #[test]
    fn test_empty_input_is_structural() {
        assert!(DataTable::read_from("".as_bytes(), path()).is_err());
    }

    #[test]
    fn test_update_and_write() {
        let mut table = DataTable::read_from(BODY.as_bytes(), path()).unwrap();
        table
            .update_column(0, |row, _| Ok((row * 10).to_string()))
            .unwrap();

        let mut out = Vec::new();
        table.write_to(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Record,DateTime,SurTem(℃)\n\
             10,2024-01-01 00:00:00,21.5\n\
             20,2024-01-01 00:01:00,21.47\n"
        );
    }
}
