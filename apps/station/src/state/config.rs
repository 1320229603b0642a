//! # Station Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     RENTRACK_DB_PATH, RENTRACK_SERIAL_PORT, RENTRACK_BAUD_RATE,         │
//! │     RENTRACK_DEBOUNCE_SECS, RENTRACK_UTC_OFFSET_MINUTES                 │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     $RENTRACK_CONFIG, else                                              │
//! │     ~/.config/rentrack/station.toml (Linux)                             │
//! │     ~/Library/Application Support/com.rentrack.station/station.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # station.toml
//! [database]
//! path = "/srv/rentrack/rental.db"   # default: platform data dir
//! max_connections = 4
//!
//! [reader]
//! port = "/dev/ttyUSB0"              # default: discover
//! baud_rate = 115200
//! read_timeout_ms = 1000
//! autostart = true
//!
//! [rental]
//! debounce_secs = 5
//! history_limit = 50
//!
//! [display]
//! utc_offset_minutes = 330           # +05:30
//! currency_symbol = "₹"
//! ```

use chrono::FixedOffset;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use rentrack_core::DEFAULT_DEBOUNCE_COOLDOWN_SECS;
use rentrack_reader::{ReaderConfig, DEFAULT_BAUD_RATE};

/// Config file name inside the platform config dir.
pub const CONFIG_FILE_NAME: &str = "station.toml";

/// Database file name inside the platform data dir.
pub const DATABASE_FILE_NAME: &str = "rental.db";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid config file {path}: {message}")]
    Parse { path: String, message: String },

    /// An environment override couldn't be parsed.
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine app data directory")]
    NoDataDir,
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Database file. `None` means `<data dir>/rental.db`.
    pub path: Option<PathBuf>,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderSettings {
    /// Serial device. `None` means discover by name.
    pub port: Option<String>,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
    /// Start the reader when the station starts.
    pub autostart: bool,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: 1_000,
            autostart: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RentalSettings {
    /// Repeat reads of the same tag within this window are ignored.
    pub debounce_secs: u64,
    /// Rows shown by `history` when no limit is given.
    pub history_limit: u32,
}

impl Default for RentalSettings {
    fn default() -> Self {
        Self {
            debounce_secs: DEFAULT_DEBOUNCE_COOLDOWN_SECS,
            history_limit: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Offset timestamps are shown in. Storage is always UTC.
    pub utc_offset_minutes: i32,
    pub currency_symbol: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 330,
            currency_symbol: "₹".to_string(),
        }
    }
}

// =============================================================================
// StationConfig
// =============================================================================

/// Complete station configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub reader: ReaderSettings,

    #[serde(default)]
    pub rental: RentalSettings,

    #[serde(default)]
    pub display: DisplaySettings,
}

impl StationConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, `$RENTRACK_CONFIG`, or the platform default)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = config_path
            .or_else(|| std::env::var_os("RENTRACK_CONFIG").map(PathBuf::from))
            .or_else(Self::default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => {
                info!(?path, "Loading station config from file");
                Self::from_file(&path)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML file. Missing sections and keys take defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Applies `RENTRACK_*` overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("RENTRACK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(port) = lookup("RENTRACK_SERIAL_PORT") {
            debug!(port = %port, "Overriding serial port from environment");
            self.reader.port = Some(port);
        }

        if let Some(baud) = lookup("RENTRACK_BAUD_RATE") {
            self.reader.baud_rate = parse_override("RENTRACK_BAUD_RATE", &baud)?;
        }

        if let Some(secs) = lookup("RENTRACK_DEBOUNCE_SECS") {
            self.rental.debounce_secs = parse_override("RENTRACK_DEBOUNCE_SECS", &secs)?;
        }

        if let Some(minutes) = lookup("RENTRACK_UTC_OFFSET_MINUTES") {
            self.display.utc_offset_minutes =
                parse_override("RENTRACK_UTC_OFFSET_MINUTES", &minutes)?;
        }

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.reader.baud_rate == 0 {
            return Err(ConfigError::Invalid(
                "reader.baud_rate must be greater than 0".into(),
            ));
        }

        if !(50..=10_000).contains(&self.reader.read_timeout_ms) {
            return Err(ConfigError::Invalid(
                "reader.read_timeout_ms must be between 50 and 10000".into(),
            ));
        }

        if self.rental.history_limit == 0 {
            return Err(ConfigError::Invalid(
                "rental.history_limit must be greater than 0".into(),
            ));
        }

        // chrono accepts offsets strictly inside ±24h; real zones span -12:00..+14:00
        if !(-720..=840).contains(&self.display.utc_offset_minutes) {
            return Err(ConfigError::Invalid(
                "display.utc_offset_minutes must be between -720 and 840".into(),
            ));
        }

        Ok(())
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Derived Settings
    // =========================================================================

    /// The configured database file, or `rental.db` in the platform data dir.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        project_dirs()
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
            .ok_or(ConfigError::NoDataDir)
    }

    pub fn reader_config(&self) -> ReaderConfig {
        ReaderConfig {
            port: self.reader.port.clone(),
            baud_rate: self.reader.baud_rate,
            read_timeout: Duration::from_millis(self.reader.read_timeout_ms),
        }
    }

    pub fn debounce_cooldown(&self) -> Duration {
        Duration::from_secs(self.rental.debounce_secs)
    }

    pub fn display_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.display.utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::InvalidValue("display.utc_offset_minutes".to_string())
        })
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "rentrack", "station")
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}
