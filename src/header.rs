//! Station header parsing for RAW and CP files.
//!
//! RAW and CP files open with two comma-separated lines: the protocol line
//! (tag, format version) and the station line (station id, longitude,
//! latitude, elevation, device model, channel or layer count). The table
//! body starts on the line after them.

use crate::constants::{
    FIELD_DELIMITER, PROTOCOL_LINE_MIN_FIELDS, PROTOCOL_TAG, STATION_LINE_MIN_FIELDS,
    header_fields as hf,
};
use crate::error::{MwrError, Result};
use crate::numeric::{format_fixed, zero_pad};
use std::io::BufRead;
use std::path::Path;
use tracing::debug;

/// The two header lines of a RAW/CP file, split into fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBlock {
    /// Line 1: protocol tag, format version, ...
    pub protocol: Vec<String>,
    /// Line 2: station id, longitude, latitude, elevation, device model, count, ...
    pub station: Vec<String>,
}

impl HeaderBlock {
    /// Split two header lines into fields
    pub fn parse(protocol_line: &str, station_line: &str, path: &Path) -> Result<Self> {
        let protocol = split_fields(protocol_line);
        let station = split_fields(station_line);

        if protocol.len() < PROTOCOL_LINE_MIN_FIELDS {
            return Err(MwrError::structural(
                path,
                format!(
                    "header line 1 has {} field(s), expected at least {}",
                    protocol.len(),
                    PROTOCOL_LINE_MIN_FIELDS
                ),
            ));
        }

        if station.len() < STATION_LINE_MIN_FIELDS {
            return Err(MwrError::structural(
                path,
                format!(
                    "header line 2 has {} field(s), expected at least {}",
                    station.len(),
                    STATION_LINE_MIN_FIELDS
                ),
            ));
        }

        Ok(Self { protocol, station })
    }

    /// Consume exactly the two header lines from `reader`
    ///
    /// The reader is left positioned at the first line of the table, so the
    /// body can be parsed from the same stream.
    pub fn read_from<R: BufRead>(reader: &mut R, path: &Path) -> Result<Self> {
        let protocol_line = read_header_line(reader, path, 1)?;
        let station_line = read_header_line(reader, path, 2)?;

        let block = Self::parse(&protocol_line, &station_line, path)?;
        debug!(
            "Read header for {}: {} protocol fields, {} station fields",
            path.display(),
            block.protocol.len(),
            block.station.len()
        );
        Ok(block)
    }

    pub fn protocol_tag(&self) -> &str {
        &self.protocol[0]
    }

    pub fn version(&self) -> &str {
        &self.protocol[1]
    }

    pub fn station_id(&self) -> &str {
        &self.station[hf::STATION_ID]
    }

    pub fn longitude(&self) -> &str {
        &self.station[hf::LONGITUDE]
    }

    pub fn latitude(&self) -> &str {
        &self.station[hf::LATITUDE]
    }

    pub fn elevation(&self) -> &str {
        &self.station[hf::ELEVATION]
    }

    pub fn device_model(&self) -> &str {
        &self.station[hf::DEVICE_MODEL]
    }

    /// Channel count (RAW) or layer count (CP)
    pub fn declared_count(&self) -> &str {
        &self.station[hf::DECLARED_COUNT]
    }

    /// A seventh station field, when present and non-empty
    pub fn extra_count(&self) -> Option<&str> {
        self.station
            .get(hf::EXTRA_COUNT)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Rewrite the header into canonical form
    ///
    /// Sets the protocol tag, renders the version as `NN.NN`, replaces the
    /// station id and fixes the precision of longitude, latitude and
    /// elevation. Other fields are kept as read.
    pub fn normalize(&mut self, station_id: &str, path: &Path) -> Result<()> {
        let version = fixed_field(self.version(), hf::VERSION_DECIMAL_PLACES, "version", path)?;
        self.protocol[0] = PROTOCOL_TAG.to_string();
        self.protocol[1] = zero_pad(&version, hf::VERSION_WIDTH);

        self.station[hf::STATION_ID] = station_id.to_string();
        self.station[hf::LONGITUDE] = fixed_field(
            self.longitude(),
            hf::LONGITUDE_DECIMAL_PLACES,
            "longitude",
            path,
        )?;
        self.station[hf::LATITUDE] =
            fixed_field(self.latitude(), hf::LATITUDE_DECIMAL_PLACES, "latitude", path)?;
        self.station[hf::ELEVATION] = fixed_field(
            self.elevation(),
            hf::ELEVATION_DECIMAL_PLACES,
            "elevation",
            path,
        )?;
        Ok(())
    }

    /// Render both lines, each terminated by a newline
    pub fn to_lines(&self) -> String {
        let delimiter = FIELD_DELIMITER.to_string();
        format!(
            "{}\n{}\n",
            self.protocol.join(&delimiter),
            self.station.join(&delimiter)
        )
    }
}

fn read_header_line<R: BufRead>(reader: &mut R, path: &Path, number: usize) -> Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(MwrError::structural(
            path,
            format!("file ends before header line {}", number),
        ));
    }
    Ok(line)
}

fn split_fields(line: &str) -> Vec<String> {
    line.trim()
        .split(FIELD_DELIMITER)
        .map(str::to_string)
        .collect()
}

fn fixed_field(value: &str, places: usize, field: &str, path: &Path) -> Result<String> {
    format_fixed(value, places)
        .map_err(|e| MwrError::structural(path, format!("header {}: {}", field, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Read};

    const LINE1: &str = "MWR,1.0\n";
    const LINE2: &str = "54511,116.47,39.8,31.26,MP3000A,22\n";

    fn path() -> &'static Path {
        Path::new("Z_UPAR_I_54511_20240101000000_O_YCCMWR_MP3000A_RAW_D.txt")
    }

    #[test]
    fn test_parse_fields() {
        let header = HeaderBlock::parse(LINE1, LINE2, path()).unwrap();
        assert_eq!(header.protocol_tag(), "MWR");
        assert_eq!(header.version(), "1.0");
        assert_eq!(header.station_id(), "54511");
        assert_eq!(header.device_model(), "MP3000A");
        assert_eq!(header.declared_count(), "22");
        assert_eq!(header.extra_count(), None);
    }

    #[test]
    fn test_extra_count_ignores_empty_field() {
        let header = HeaderBlock::parse(LINE1, "54511,1,2,3,M,22,\n", path()).unwrap();
        assert_eq!(header.extra_count(), None);
        let header = HeaderBlock::parse(LINE1, "54511,1,2,3,M,22,83\n", path()).unwrap();
        assert_eq!(header.extra_count(), Some("83"));
    }

    #[test]
    fn test_short_lines_are_structural_errors() {
        assert!(matches!(
            HeaderBlock::parse("MWR\n", LINE2, path()),
            Err(MwrError::Structural { .. })
        ));
        assert!(matches!(
            HeaderBlock::parse(LINE1, "54511,116.47,39.8\n", path()),
            Err(MwrError::Structural { .. })
        ));
    }

    #[test]
    fn test_read_leaves_reader_at_table() {
        let content = format!("{}{}Record,DateTime\n1,2024-01-01 00:00:00\n", LINE1, LINE2);
        let mut reader = BufReader::new(content.as_bytes());
        let header = HeaderBlock::read_from(&mut reader, path()).unwrap();
        assert_eq!(header.station.len(), 6);

        let mut rest = String::new();
        reader.read_to_string(&mut rest).unwrap();
        assert!(rest.starts_with("Record,DateTime\n"));
    }

    #[test]
    fn test_read_truncated_file() {
        let mut reader = BufReader::new(LINE1.as_bytes());
        let err = HeaderBlock::read_from(&mut reader, path()).unwrap_err();
        assert!(err.to_string().contains("header line 2"));
    }

    #[test]
    fn test_normalize() {
        let mut header =
            HeaderBlock::parse("XYZ,1\n", "00000,116.47,39.8,31.26,MP3000A,22\n", path()).unwrap();
        header.normalize("54511", path()).unwrap();
        assert_eq!(
            header.to_lines(),
            "MWR,01.00\n54511,116.4700,39.8000,31.3,MP3000A,22\n"
        );
    }

    #[test]
    fn test_normalize_rejects_non_numeric_longitude() {
        let mut header =
            HeaderBlock::parse(LINE1, "54511,east,39.8,31.26,MP3000A,22\n", path()).unwrap();
        let err = header.normalize("54511", path()).unwrap_err();
        assert!(err.to_string().contains("longitude"));
    }
}
