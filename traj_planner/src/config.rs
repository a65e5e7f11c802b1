//! Runner configuration: one TOML file with `[shared]`, `[planner]` and
//! `[runner]` sections.
//!
//! ```toml
//! [shared]
//! service_name = "traj-sim"
//!
//! [planner]
//! max_velocity = 10.0
//! ini_max_velocity = 12.0
//! max_acceleration = 100.0
//!
//! [runner]
//! telemetry_interval = 10
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use traj_common::config::{ConfigError, ConfigLoader, PlannerConfig, SharedConfig};

// ─── Runner Section ─────────────────────────────────────────────────

/// Pacing and publication settings of the simulation runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Publish telemetry every N cycles (cycles with events always publish).
    #[serde(default = "default_telemetry_interval")]
    pub telemetry_interval: u64,

    /// Stop after this many cycles (0 = run until the program completes).
    #[serde(default)]
    pub max_cycles: u64,

    /// CPU core for the RT thread (`rt` feature only).
    #[serde(default = "default_cpu_core")]
    pub cpu_core: usize,

    /// SCHED_FIFO priority (`rt` feature only).
    #[serde(default = "default_rt_priority")]
    pub rt_priority: i32,

    /// Sleep to the cycle boundary; `false` runs ticks back to back.
    #[serde(default = "default_pacing")]
    pub pacing: bool,
}

fn default_telemetry_interval() -> u64 {
    100
}
fn default_cpu_core() -> usize {
    1
}
fn default_rt_priority() -> i32 {
    80
}
fn default_pacing() -> bool {
    true
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            telemetry_interval: default_telemetry_interval(),
            max_cycles: 0,
            cpu_core: default_cpu_core(),
            rt_priority: default_rt_priority(),
            pacing: default_pacing(),
        }
    }
}

impl RunnerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telemetry_interval == 0 {
            return Err(ConfigError::ValidationError(
                "telemetry_interval must be >= 1".to_string(),
            ));
        }
        if !(1..=99).contains(&self.rt_priority) {
            return Err(ConfigError::ValidationError(format!(
                "rt_priority {} out of range [1, 99]",
                self.rt_priority
            )));
        }
        Ok(())
    }
}

// ─── Loaded Config Bundle ───────────────────────────────────────────

/// Complete validated configuration, ready for the runner.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadedConfig {
    pub shared: SharedConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
}

impl LoadedConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.planner.validate()?;
        self.runner.validate()
    }
}

/// Load and validate the runner configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let config = LoadedConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML string (for testing).
pub fn load_config_from_str(content: &str) -> Result<LoadedConfig, ConfigError> {
    let config = LoadedConfig::from_toml(content)?;
    config.validate()?;
    Ok(config)
}
