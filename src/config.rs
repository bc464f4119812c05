//! Configuration management and validation.
//!
//! The configuration is a JSON document in the layout the station software
//! already uses (`dir_path`, `save_path`, `heads.raw` ...). It is loaded and
//! validated once at startup and then shared read-only by every component.

use crate::constants::{
    DEFAULT_CAL_HEADS, DEFAULT_CONFIG_PATH, DEFAULT_CP_HEADS, DEFAULT_INPUT_DIR,
    DEFAULT_OUTPUT_DIR, DEFAULT_RAW_HEADS, DEFAULT_STA_HEADS, USER_CONFIG_DIR, USER_CONFIG_FILE,
    columns, precision,
};
use crate::error::{MwrError, Result};
use crate::models::FileRecordType;
use crate::schema::SchemaRegistry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Expected column names per file type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heads {
    pub raw: Vec<String>,
    pub cp: Vec<String>,
    pub sta: Vec<String>,
    pub cal: Vec<String>,
}

impl Heads {
    pub fn for_type(&self, kind: FileRecordType) -> &[String] {
        match kind {
            FileRecordType::Raw => &self.raw,
            FileRecordType::Cp => &self.cp,
            FileRecordType::Sta => &self.sta,
            FileRecordType::Cal => &self.cal,
        }
    }
}

impl Default for Heads {
    fn default() -> Self {
        Self {
            raw: to_owned(DEFAULT_RAW_HEADS),
            cp: to_owned(DEFAULT_CP_HEADS),
            sta: to_owned(DEFAULT_STA_HEADS),
            cal: to_owned(DEFAULT_CAL_HEADS),
        }
    }
}

/// Column precision rules applied by the normalizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeRules {
    /// RAW columns rendered with two decimal places
    pub raw_two_decimal: Vec<String>,

    /// RAW columns rendered with three decimal places, besides the channels
    pub raw_three_decimal: Vec<String>,

    /// CP columns rendered with two decimal places
    pub cp_two_decimal: Vec<String>,

    /// CP column ending in the layer suffix that is not a layer
    pub cp_layer_exception: String,
}

impl Default for NormalizeRules {
    fn default() -> Self {
        Self {
            raw_two_decimal: to_owned(precision::RAW_TWO_DECIMAL),
            raw_three_decimal: to_owned(precision::RAW_THREE_DECIMAL),
            cp_two_decimal: to_owned(precision::CP_TWO_DECIMAL),
            cp_layer_exception: columns::CP_CLOUD_BASE.to_string(),
        }
    }
}

/// Global configuration for MWR processing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the files to check or transform
    #[serde(rename = "dir_path")]
    pub input_dir: PathBuf,

    /// Directory that receives normalized files
    #[serde(rename = "save_path")]
    pub output_dir: PathBuf,

    /// Column schemas per file type
    pub heads: Heads,

    /// Number of files processed concurrently
    pub workers: usize,

    /// Precision rules for the normalizer
    pub normalize: NormalizeRules,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            heads: Heads::default(),
            workers: num_cpus::get(),
            normalize: NormalizeRules::default(),
        }
    }
}

impl Config {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            MwrError::configuration(format!("cannot read {}: {}", path.display(), e))
        })?;

        let config: Config = serde_json::from_str(&text).map_err(|e| {
            MwrError::configuration(format!("cannot parse {}: {}", path.display(), e))
        })?;

        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Resolve the configuration to use for this run
    ///
    /// An explicit path must exist. Otherwise `config/fc_config.json` in the
    /// working directory is tried, then the user config directory, and the
    /// built-in defaults are used when neither exists.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = PathBuf::from(DEFAULT_CONFIG_PATH);
        if local.is_file() {
            return Self::load(&local);
        }

        if let Some(user_dir) = dirs::config_dir() {
            let user = user_dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE);
            if user.is_file() {
                return Self::load(&user);
            }
        }

        info!("No configuration file found, using built-in defaults");
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    /// Check the schema registry entries before any file is processed
    pub fn validate(&self) -> Result<()> {
        for kind in FileRecordType::ALL {
            let heads = self.heads.for_type(kind);
            let key = kind.config_key();

            if heads.is_empty() {
                return Err(MwrError::configuration(format!("heads.{} is empty", key)));
            }

            if kind != FileRecordType::Sta && heads.len() < 2 {
                return Err(MwrError::configuration(format!(
                    "heads.{} needs at least two column names",
                    key
                )));
            }

            if kind != FileRecordType::Cal {
                for required in [columns::RECORD, columns::DATE_TIME] {
                    if !heads.iter().any(|h| h == required) {
                        return Err(MwrError::configuration(format!(
                            "heads.{} does not contain '{}'",
                            key, required
                        )));
                    }
                }
            }
        }

        if self.workers == 0 {
            return Err(MwrError::configuration("workers must be at least 1"));
        }

        Ok(())
    }

    /// Build the per-type schema lookup from `heads`
    pub fn schema_registry(&self) -> Result<SchemaRegistry> {
        SchemaRegistry::from_config(self)
    }

    pub fn with_input_dir(mut self, input_dir: PathBuf) -> Self {
        self.input_dir = input_dir;
        self
    }

    pub fn with_output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}

fn to_owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", json).unwrap();
        file
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.workers >= 1);
        assert_eq!(config.heads.raw.last().unwrap(), "QCFlag_BT");
    }

    #[test]
    fn test_load_original_layout() {
        let file = write_config(
            r#"{
                "dir_path": "/srv/mwr/in",
                "save_path": "/srv/mwr/out",
                "heads": {
                    "raw": ["Record", "DateTime", "QCFlag_BT"],
                    "cp": ["Record", "DateTime", "QCFlag"],
                    "sta": ["Record", "DateTime"],
                    "cal": ["Record", "CalParaType"]
                }
            }"#,
        );

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("/srv/mwr/in"));
        assert_eq!(config.output_dir, PathBuf::from("/srv/mwr/out"));
        assert_eq!(config.heads.raw.len(), 3);
        assert_eq!(config.normalize, NormalizeRules::default());
    }

    #[test]
    fn test_missing_schema_entry_is_configuration_error() {
        let file = write_config(
            r#"{ "heads": { "raw": ["Record", "DateTime"], "cp": ["Record", "DateTime"], "sta": ["Record", "DateTime"] } }"#,
        );
        assert!(matches!(
            Config::load(file.path()),
            Err(MwrError::Configuration { .. })
        ));
    }

    #[test]
    fn test_schema_without_record_column() {
        let mut config = Config::default();
        config.heads.sta = vec!["DateTime".to_string()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("heads.sta"));
    }

    #[test]
    fn test_empty_schema_rejected() {
        let mut config = Config::default();
        config.heads.cal.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_missing_file() {
        let result = Config::discover(Some(Path::new("/nonexistent/fc_config.json")));
        assert!(matches!(result, Err(MwrError::Configuration { .. })));
    }

    #[test]
    fn test_builders() {
        let config = Config::default()
            .with_input_dir(PathBuf::from("in"))
            .with_output_dir(PathBuf::from("out"))
            .with_workers(2);
        assert_eq!(config.input_dir, PathBuf::from("in"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.workers, 2);
    }
}
