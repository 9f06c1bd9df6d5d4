//! Service configuration loaded from `tsumon.toml`
//!
//! Every field has a default, so a missing file or a partial file is
//! fine. The file path comes from `TSUMON_CONFIG` (which may be set in a
//! `.env` file), falling back to `./tsumon.toml`.
//!
//! ```toml
//! [feed]
//! url = "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_day.geojson"
//! poll_interval_secs = 120
//!
//! [thresholds]
//! magnitude = 7.0
//! depth_km = 50.0
//! distance_km = 120.0
//!
//! [markers]
//! popup_delay_ms = 5000
//! pulse_duration_ms = 40000
//!
//! [logging]
//! level = "info"
//! file = "tsumon.log"
//! ```

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::alert::timeline::{MarkerTimeline, MAX_MARKER_DELAY_MS, POPUP_DELAY_MS, PULSE_DURATION_MS};
use crate::ingest::usgs_quakes::{Region, ALL_DAY_FEED_URL};
use crate::logging::LogLevel;
use crate::model::TsunamiThresholds;

pub const CONFIG_ENV_VAR: &str = "TSUMON_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "./tsumon.toml";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    Io { path: String, message: String },
    /// The file is not valid TOML for this schema.
    Parse { path: String, message: String },
    /// A value parsed but makes no sense (negative delay, unknown level...).
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, message } => write!(f, "reading config {}: {}", path, message),
            ConfigError::Parse { path, message } => write!(f, "parsing config {}: {}", path, message),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub thresholds: TsunamiThresholds,
    pub markers: MarkerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    pub url: String,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub region: Region,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: ALL_DAY_FEED_URL.to_string(),
            poll_interval_secs: 120,
            request_timeout_secs: 30,
            region: Region::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarkerConfig {
    pub popup_delay_ms: i64,
    pub pulse_duration_ms: i64,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            popup_delay_ms: POPUP_DELAY_MS,
            pulse_duration_ms: PULSE_DURATION_MS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
    /// Where to write the rendered layer as JSON after each cycle.
    pub layer_snapshot: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: true,
            layer_snapshot: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Loads and validates a config file. A missing file yields defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path_ref).map_err(|e| ConfigError::Io {
            path: path_ref.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path_ref.display().to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `.env`, then the file named by `TSUMON_CONFIG` or the default path.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let path = std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.markers.popup_delay_ms < 0 || self.markers.pulse_duration_ms < 0 {
            return Err(ConfigError::Invalid("marker delays must not be negative".to_string()));
        }
        if self.markers.popup_delay_ms > MAX_MARKER_DELAY_MS
            || self.markers.pulse_duration_ms > MAX_MARKER_DELAY_MS
        {
            return Err(ConfigError::Invalid(format!(
                "marker delays must not exceed {} ms",
                MAX_MARKER_DELAY_MS
            )));
        }
        if self.feed.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid("poll_interval_secs must be at least 1".to_string()));
        }
        let r = &self.feed.region;
        if r.min_lat > r.max_lat || r.min_lon > r.max_lon {
            return Err(ConfigError::Invalid("feed region bounds are inverted".to_string()));
        }
        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        self.logging.level.parse().map_err(ConfigError::Invalid)
    }

    pub fn thresholds(&self) -> TsunamiThresholds {
        self.thresholds.clone()
    }

    pub fn marker_timeline(&self) -> MarkerTimeline {
        MarkerTimeline {
            popup_delay: chrono::Duration::milliseconds(self.markers.popup_delay_ms),
            pulse_duration: chrono::Duration::milliseconds(self.markers.pulse_duration_ms),
        }
    }
}
