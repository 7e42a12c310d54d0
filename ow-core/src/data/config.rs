//! Configuration management
//!
//! Defaults, JSON config files and validation. Command-line overrides are
//! applied by the daemon on top of whatever is loaded here.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{output, paths, timing};
use crate::error::{OnewireError, Result};

fn default_output() -> String {
    output::DEFAULT_PATTERN.to_string()
}

fn default_poll_interval() -> f64 {
    timing::DEFAULT_POLL_INTERVAL_SECS
}

fn default_devices_dir() -> PathBuf {
    PathBuf::from(paths::W1_DEVICES_DIR)
}

fn default_module_path() -> PathBuf {
    PathBuf::from(paths::W1_THERM_MODULE)
}

/// Runtime configuration of the logger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggerConfig {
    /// Output filename pattern (strftime); empty disables file output
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: f64,
    /// Start a new file at local midnight
    #[serde(default)]
    pub daily_rotation: bool,
    /// Run modprobe when the thermometer driver is missing
    #[serde(default)]
    pub auto_modprobe: bool,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub quiet: bool,
    #[serde(default = "default_devices_dir")]
    pub devices_dir: PathBuf,
    #[serde(default = "default_module_path")]
    pub module_path: PathBuf,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            poll_interval_secs: default_poll_interval(),
            daily_rotation: false,
            auto_modprobe: false,
            verbose: false,
            quiet: false,
            devices_dir: default_devices_dir(),
            module_path: default_module_path(),
        }
    }
}

impl LoggerConfig {
    /// Poll interval as a Duration
    ///
    /// Out-of-range values (which `validate` rejects) fall back to the default.
    pub fn poll_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.poll_interval_secs)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or_else(|| Duration::from_secs_f64(timing::DEFAULT_POLL_INTERVAL_SECS))
    }

    /// Output pattern, or None when file output is disabled
    pub fn output_pattern(&self) -> Option<&str> {
        if self.output.is_empty() {
            None
        } else {
            Some(&self.output)
        }
    }

    pub fn validate(&self) -> Result<()> {
        let secs = self.poll_interval_secs;
        if !secs.is_finite() || secs <= 0.0 {
            return Err(OnewireError::invalid_config(
                "poll_interval_secs",
                format!("must be a positive number of seconds, got {}", secs),
            ));
        }
        match Duration::try_from_secs_f64(secs) {
            Ok(d) if !d.is_zero() => {}
            Ok(_) => {
                return Err(OnewireError::invalid_config(
                    "poll_interval_secs",
                    format!("{} seconds rounds to zero", secs),
                ))
            }
            Err(_) => {
                return Err(OnewireError::invalid_config(
                    "poll_interval_secs",
                    format!("{} seconds is out of range", secs),
                ))
            }
        }
        if let Some(pattern) = self.output_pattern() {
            validate_output_pattern(pattern)?;
        }
        Ok(())
    }
}

/// Rejects patterns chrono cannot format (unknown `%` specifiers)
pub fn validate_output_pattern(pattern: &str) -> Result<()> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(OnewireError::output_pattern(
            pattern,
            "contains an unsupported strftime specifier",
        ));
    }
    Ok(())
}

/// Load a config file; every missing field takes its default
pub fn load_config(path: &Path) -> Result<LoggerConfig> {
    let data = fs::read_to_string(path).map_err(|source| OnewireError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let config: LoggerConfig = serde_json::from_str(&data)?;
    debug!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

/// Load the system config if it exists, otherwise defaults
pub fn load_system_config() -> Result<LoggerConfig> {
    let path = Path::new(paths::SYSTEM_CONFIG);
    if path.exists() {
        load_config(path)
    } else {
        Ok(LoggerConfig::default())
    }
}
