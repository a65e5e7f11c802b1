//! Configuration loading traits and types.
//!
//! Every application in the workspace loads TOML through [`ConfigLoader`] and
//! embeds [`SharedConfig`] for logging and identification.
//!
//! # Usage
//!
//! ```rust,no_run
//! use traj_common::config::{ConfigError, ConfigLoader, PlannerConfig, SharedConfig};
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Debug, Deserialize)]
//! struct AppConfig {
//!     shared: SharedConfig,
//!     planner: PlannerConfig,
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = AppConfig::load(Path::new("planner.toml"))?;
//!     config.planner.validate()?;
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::consts::{
    CYCLE_TIME_US, CYCLE_TIME_US_MAX, CYCLE_TIME_US_MIN, DEFAULT_QUEUE_SIZE, QUEUE_SIZE_MAX,
};
use crate::motion::TermCond;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Common configuration fields shared across applications.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "traj-sim-01"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl SharedConfig {
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// ─── Planner Config ─────────────────────────────────────────────────

/// Trajectory planner limits and defaults.
///
/// Angular limits of `0.0` mean "not configured": pure-rotation segments then
/// fall back to the translational limits.
///
/// # TOML Example
///
/// ```toml
/// [planner]
/// queue_size = 32
/// cycle_time_us = 1000
/// max_velocity = 10.0
/// ini_max_velocity = 12.0
/// max_acceleration = 100.0
/// term_cond = "blend"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Segment queue capacity (0 selects the default).
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,

    /// Control cycle [µs].
    #[serde(default = "default_cycle_time_us")]
    pub cycle_time_us: u32,

    /// Requested tool-tip velocity (the feed word).
    pub max_velocity: f64,

    /// Machine velocity reachable with feed override above 100%.
    pub ini_max_velocity: f64,

    /// Absolute velocity ceiling, independent of feed scale (0 = unlimited).
    #[serde(default)]
    pub velocity_limit: f64,

    pub max_acceleration: f64,

    #[serde(default)]
    pub max_angular_velocity: f64,

    #[serde(default)]
    pub max_angular_acceleration: f64,

    /// Initial feed scale (1.0 = 100%).
    #[serde(default = "default_feed_scale")]
    pub feed_scale: f64,

    #[serde(default)]
    pub term_cond: TermCond,
}

fn default_queue_size() -> usize {
    DEFAULT_QUEUE_SIZE
}
fn default_cycle_time_us() -> u32 {
    CYCLE_TIME_US
}
fn default_feed_scale() -> f64 {
    1.0
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            queue_size: DEFAULT_QUEUE_SIZE,
            cycle_time_us: CYCLE_TIME_US,
            max_velocity: 10.0,
            ini_max_velocity: 10.0,
            velocity_limit: 0.0,
            max_acceleration: 100.0,
            max_angular_velocity: 0.0,
            max_angular_acceleration: 0.0,
            feed_scale: 1.0,
            term_cond: TermCond::Blend,
        }
    }
}

impl PlannerConfig {
    /// Cycle time in seconds.
    #[inline]
    pub fn cycle_time_secs(&self) -> f64 {
        self.cycle_time_us as f64 * 1e-6
    }

    /// Validate parameter bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_size > QUEUE_SIZE_MAX {
            return Err(ConfigError::ValidationError(format!(
                "queue_size {} exceeds {}",
                self.queue_size, QUEUE_SIZE_MAX
            )));
        }
        if self.cycle_time_us < CYCLE_TIME_US_MIN || self.cycle_time_us > CYCLE_TIME_US_MAX {
            return Err(ConfigError::ValidationError(format!(
                "cycle_time_us {} out of range [{}, {}]",
                self.cycle_time_us, CYCLE_TIME_US_MIN, CYCLE_TIME_US_MAX
            )));
        }
        for (name, value) in [
            ("max_velocity", self.max_velocity),
            ("ini_max_velocity", self.ini_max_velocity),
            ("max_acceleration", self.max_acceleration),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be > 0 (got {value})"
                )));
            }
        }
        for (name, value) in [
            ("velocity_limit", self.velocity_limit),
            ("max_angular_velocity", self.max_angular_velocity),
            ("max_angular_acceleration", self.max_angular_acceleration),
            ("feed_scale", self.feed_scale),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be >= 0 (got {value})"
                )));
            }
        }
        Ok(())
    }
}

// ─── Loader ─────────────────────────────────────────────────────────

/// Trait for loading configuration from TOML files.
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if the file is unreadable or the TOML is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        Self::from_toml(&content)
    }

    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
