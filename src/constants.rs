//! Application constants for the MWR processor
//!
//! Fixed tokens, vocabularies and thresholds that the format rules depend on,
//! plus the default column schemas used when no configuration file is given.

// =============================================================================
// File Layout
// =============================================================================

/// Protocol tag expected as the first field of a RAW/CP file
pub const PROTOCOL_TAG: &str = "MWR";

/// Field delimiter inside every line of every file type
pub const FIELD_DELIMITER: char = ',';

/// Delimiter between the fields of a file name
pub const FILE_NAME_DELIMITER: char = '_';

/// Position of the station id among the file name fields
pub const FILE_NAME_STATION_INDEX: usize = 3;

/// Minimum number of fields a file name must have
pub const FILE_NAME_MIN_FIELDS: usize = 5;

/// Number of header lines preceding the table in RAW/CP files
pub const HEADER_LINE_COUNT: usize = 2;

/// Minimum number of fields on header line 1 (tag, version)
pub const PROTOCOL_LINE_MIN_FIELDS: usize = 2;

/// Minimum number of fields on header line 2 (station .. count)
pub const STATION_LINE_MIN_FIELDS: usize = 6;

// =============================================================================
// Column Names
// =============================================================================

pub mod columns {
    /// Per-row sequence number column
    pub const RECORD: &str = "Record";

    /// Per-row timestamp column
    pub const DATE_TIME: &str = "DateTime";

    /// Brightness temperature quality flag column in RAW files
    pub const QC_FLAG_BT: &str = "QCFlag_BT";

    /// Value written into [`QC_FLAG_BT`] by the normalizer
    pub const QC_FLAG_BT_CLEAR: &str = "00000";

    /// Prefix of RAW channel columns
    pub const RAW_CHANNEL_PREFIX: &str = "Ch";

    /// Prefix of CAL channel columns (note the trailing space)
    pub const CAL_CHANNEL_PREFIX: &str = "Ch ";

    /// Unit suffix of CP layer columns
    pub const CP_LAYER_SUFFIX: &str = "(km)";

    /// CP column that carries the layer suffix but is not a layer
    pub const CP_CLOUD_BASE: &str = "CloudBase(km)";
}

// =============================================================================
// Timestamps
// =============================================================================

pub mod timestamps {
    /// chrono format of every timestamp field
    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// Prefix pattern a timestamp field must match
    pub const PATTERN: &str = r"^\d{4}-\d{2}-\d{2}\s\d{2}:\d{2}:\d{2}";

    /// Largest permitted gap between consecutive timestamps, in seconds
    pub const MAX_GAP_SECONDS: i64 = 120;

    /// Physical CP rows sharing one logical timestamp
    pub const CP_ROWS_PER_TIMESTAMP: usize = 4;
}

// =============================================================================
// Header Field Rules
// =============================================================================

pub mod header_fields {
    /// Pattern of the station id on header line 2
    pub const STATION_ID_PATTERN: &str = r"^\w\d{4}";

    /// Integer and decimal digits of the format version number
    pub const VERSION_INTEGER_DIGITS: usize = 2;
    pub const VERSION_DECIMAL_PLACES: usize = 2;

    /// Width the normalized version number is zero-padded to
    pub const VERSION_WIDTH: usize = 5;

    pub const LONGITUDE_DECIMAL_PLACES: usize = 4;
    pub const LATITUDE_DECIMAL_PLACES: usize = 4;
    pub const ELEVATION_DECIMAL_PLACES: usize = 1;

    /// Field positions on header line 2
    pub const STATION_ID: usize = 0;
    pub const LONGITUDE: usize = 1;
    pub const LATITUDE: usize = 2;
    pub const ELEVATION: usize = 3;
    pub const DEVICE_MODEL: usize = 4;
    pub const DECLARED_COUNT: usize = 5;
    pub const EXTRA_COUNT: usize = 6;
}

// =============================================================================
// Calibration Vocabularies
// =============================================================================

pub mod calibration {
    /// Methods allowed on a CAL timestamp line
    pub const METHODS: &[&str] = &["GAIN", "ABSOLUTE", "NOISE", "TIPPING", "OTHER"];

    /// Parameter types allowed on a CAL data line
    pub const PARAMETER_TYPES: &[&str] = &["Alpha", "Noise Tn", "Gain", "TSysN", "N/A"];

    /// Prefix of a CAL column header line
    pub const HEADER_PREFIX: &str = "Record";

    /// Pattern of a CAL data line
    pub const DATA_LINE_PATTERN: &str = r"^\d+,";
}

// =============================================================================
// Normalization Precision
// =============================================================================

pub mod precision {
    pub const TWO: usize = 2;
    pub const THREE: usize = 3;

    /// RAW columns rendered with two decimal places
    pub const RAW_TWO_DECIMAL: &[&str] = &["SurTem(℃)", "SurHum(%)", "SurPre(hPa)", "Tir(℃)"];

    /// RAW fixed columns rendered with three decimal places (channels are added by prefix)
    pub const RAW_THREE_DECIMAL: &[&str] = &["Az(deg)", "El(deg)"];

    /// CP columns rendered with two decimal places
    pub const CP_TWO_DECIMAL: &[&str] = &[
        "SurTem(℃)",
        "SurHum(%)",
        "SurPre(hPa)",
        "Tir(℃)",
        "CloudBase(km)",
        "Vint(mm)",
        "Lqint(mm)",
    ];
}

// =============================================================================
// Default Column Schemas
// =============================================================================

/// RAW columns: fixed leading names, then channels, then the last name
pub const DEFAULT_RAW_HEADS: &[&str] = &[
    "Record",
    "DateTime",
    "SurTem(℃)",
    "SurHum(%)",
    "SurPre(hPa)",
    "Tir(℃)",
    "Rain",
    "QCFlag",
    "Az(deg)",
    "El(deg)",
    "QCFlag_BT",
];

/// CP columns: fixed leading names, then height layers, then the last name
pub const DEFAULT_CP_HEADS: &[&str] = &[
    "Record",
    "DateTime",
    "SurTem(℃)",
    "SurHum(%)",
    "SurPre(hPa)",
    "Tir(℃)",
    "Rain",
    "CloudBase(km)",
    "Vint(mm)",
    "Lqint(mm)",
    "QCFlag",
];

/// STA columns, all fixed
pub const DEFAULT_STA_HEADS: &[&str] = &[
    "Record",
    "DateTime",
    "SurTem(℃)",
    "SurHum(%)",
    "SurPre(hPa)",
    "Rain",
    "RecTem1(℃)",
    "RecTem2(℃)",
    "PowerStatus",
    "CommStatus",
];

/// CAL column header prefix; channel names follow
pub const DEFAULT_CAL_HEADS: &[&str] = &["Record", "CalParaType"];

// =============================================================================
// Runtime Defaults
// =============================================================================

/// Default input directory when neither config nor CLI provides one
pub const DEFAULT_INPUT_DIR: &str = "data";

/// Default output directory when neither config nor CLI provides one
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Config file looked up relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/fc_config.json";

/// Config file name inside the user config directory
pub const USER_CONFIG_DIR: &str = "mwr_processor";
pub const USER_CONFIG_FILE: &str = "config.json";

/// Progress bar refresh interval
pub const PROGRESS_UPDATE_INTERVAL_MS: u64 = 100;
