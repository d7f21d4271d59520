//! Configuration loading from TOML.
//!
//! All tables are immutable after load; validation runs once up front so
//! the pipeline never sees a half-formed catalog or profile.

mod catalog;
mod logging;
mod profiles;
mod telegram;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{FixedOffset, NaiveTime, Weekday};
use serde::Deserialize;

use crate::domain::{AspectCatalog, CelestialBody, ProfileTable};
use crate::error::{ConfigError, Result};
use crate::session::SessionWindow;

pub use catalog::AspectEntry;
pub use logging::LoggingConfig;
pub use profiles::{InstrumentsConfig, ProfileEntry};
pub use telegram::TelegramConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    pub telegram: TelegramConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub report: ReportConfig,

    pub ephemeris: EphemerisConfig,

    #[serde(default)]
    pub market: Option<MarketConfig>,

    #[serde(default = "catalog::default_entries")]
    pub aspects: Vec<AspectEntry>,

    #[serde(default)]
    pub instruments: InstrumentsConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.telegram.validate()?;
        self.scheduler.validate()?;
        self.session.window().map(|_| ())?;
        catalog::validate(&self.aspects)?;
        profiles::validate(&self.instruments)?;
        Ok(())
    }

    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// The validated, immutable aspect catalog.
    #[must_use]
    pub fn catalog(&self) -> AspectCatalog {
        catalog::build(&self.aspects)
    }

    /// The validated, immutable profile table.
    #[must_use]
    pub fn profile_table(&self) -> ProfileTable {
        profiles::build_table(&self.instruments)
    }
}

/// Evaluation cadence and failure spool.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,

    /// Directory failed reports are written to.
    #[serde(default = "default_spool_dir")]
    pub spool_dir: PathBuf,
}

fn default_check_interval_secs() -> u64 {
    60
}

fn default_spool_dir() -> PathBuf {
    PathBuf::from("spool")
}

impl SchedulerConfig {
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.check_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.check_interval_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval_secs(),
            spool_dir: default_spool_dir(),
        }
    }
}

/// Market session hours in a fixed UTC offset, plus the orb tightening
/// applied while the session is open.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_open")]
    pub open: String,

    #[serde(default = "default_close")]
    pub close: String,

    #[serde(default = "default_days")]
    pub days: Vec<String>,

    #[serde(default = "default_offset_minutes")]
    pub utc_offset_minutes: i32,

    #[serde(default = "default_orb_reduction")]
    pub orb_reduction: f64,
}

fn default_open() -> String {
    "09:15".to_string()
}

fn default_close() -> String {
    "15:30".to_string()
}

fn default_days() -> Vec<String> {
    ["Mon", "Tue", "Wed", "Thu", "Fri"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_offset_minutes() -> i32 {
    330
}

fn default_orb_reduction() -> f64 {
    0.3
}

impl SessionConfig {
    /// Build the validated session window.
    pub fn window(&self) -> std::result::Result<SessionWindow, ConfigError> {
        let open = parse_time("session.open", &self.open)?;
        let close = parse_time("session.close", &self.close)?;
        if close <= open {
            return Err(ConfigError::InvalidValue {
                field: "session.close",
                reason: format!("{} is not after {}", self.close, self.open),
            });
        }

        let mut days = Vec::new();
        for day in &self.days {
            let weekday = Weekday::from_str(day).map_err(|_| ConfigError::InvalidValue {
                field: "session.days",
                reason: format!("unknown weekday: {day}"),
            })?;
            days.push(weekday);
        }

        let offset = FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "session.utc_offset_minutes",
                reason: format!("{} is out of range", self.utc_offset_minutes),
            }
        })?;

        if self.orb_reduction < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "session.orb_reduction",
                reason: format!("{} is negative", self.orb_reduction),
            });
        }

        Ok(SessionWindow::new(
            open,
            close,
            days,
            offset,
            self.orb_reduction,
        ))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            open: default_open(),
            close: default_close(),
            days: default_days(),
            utc_offset_minutes: default_offset_minutes(),
            orb_reduction: default_orb_reduction(),
        }
    }
}

fn parse_time(
    field: &'static str,
    value: &str,
) -> std::result::Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|e| ConfigError::InvalidValue {
        field,
        reason: e.to_string(),
    })
}

/// Report rendering options.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Include the planetary-positions section.
    #[serde(default = "default_include_positions")]
    pub include_positions: bool,
}

fn default_include_positions() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_positions: default_include_positions(),
        }
    }
}

/// Where planetary longitudes come from.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum EphemerisConfig {
    /// Fixed longitudes, handy for dry runs and tests.
    Static {
        #[serde(default)]
        positions: BTreeMap<CelestialBody, f64>,
    },
    /// Transit dataset file (see the `dataset` module for the schema).
    Dataset { path: PathBuf },
}

/// Optional quote endpoint decorating reports during market hours.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    pub api_url: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_quote_timeout_secs")]
    pub timeout_secs: u64,

    /// Instrument id to vendor symbol, e.g. NIFTY = "NSE:NIFTY50".
    #[serde(default)]
    pub symbols: BTreeMap<String, String>,
}

fn default_api_key_env() -> String {
    "TRADINGVIEW_API_KEY".to_string()
}

fn default_quote_timeout_secs() -> u64 {
    5
}
