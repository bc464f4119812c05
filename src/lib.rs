//! MWR Processor Library
//!
//! A Rust library for checking and normalizing microwave radiometer (MWR)
//! station data files.
//!
//! This library provides tools for:
//! - Recognising the four file types (RAW, CP, STA, CAL) from the file name
//! - Validating header lines, column names, record numbering and timestamps,
//!   with a per-section status code and diagnostics for every file
//! - Rewriting files into canonical form (header precision, contiguous
//!   records, fixed column precision)
//! - Running either operation over a whole directory with per-file isolation

pub mod calibration;
pub mod check;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod header;
pub mod models;
pub mod numeric;
pub mod processor;
pub mod schema;
pub mod table;
pub mod transform;

// Re-export commonly used types
pub use check::{FormatChecker, Section, ValidationReport};
pub use config::Config;
pub use error::{MwrError, Result};
pub use models::{FileName, FileRecordType, ProcessingStats};
pub use processor::{BatchProcessor, FileOutcome};
pub use schema::SchemaRegistry;
pub use transform::Normalizer;
