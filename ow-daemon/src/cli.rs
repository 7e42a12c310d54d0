//! Command Line Interface

use std::path::PathBuf;

use clap::Parser;
use ow_core::{load_config, load_system_config, LoggerConfig};
use ow_error::Result;

#[derive(Parser, Debug)]
#[command(name = "onewire-logd")]
#[command(version)]
#[command(about = "Log 1-Wire thermometer readings to rotating CSV files")]
#[command(long_about = "Log 1-Wire thermometer readings to rotating CSV files

Polls every sensor under /sys/bus/w1/devices on a fixed cadence and appends
one row per poll. A new file is started whenever the set of sensors changes
(and at midnight with --daily).

ENVIRONMENT VARIABLES:
    ONEWIRE_LOG=debug      Diagnostic log filter (default: info)

FILES:
    /etc/onewire-log/config.json    Optional configuration (JSON)")]
pub struct Cli {
    /// Print every reading to screen (as well as to file)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress informational messages on stdout
    #[arg(short, long)]
    pub quiet: bool,

    /// Output filename with strftime elements; empty string disables output
    /// [default: onewire_logs/w1_%Y%m%d_%H%M%S.csv]
    #[arg(short, long, value_name = "PATTERN")]
    pub output: Option<String>,

    /// Poll interval in seconds [default: 30]
    #[arg(short, long, value_name = "SEC")]
    pub poll_interval: Option<f64>,

    /// Run "sudo modprobe w1_therm" if the driver is not loaded
    #[arg(short = 'm', long)]
    pub modprobe: bool,

    /// Start a new output file at local midnight
    #[arg(short, long)]
    pub daily: bool,

    /// Configuration file (JSON); replaces /etc/onewire-log/config.json
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// 1-Wire devices directory
    #[arg(long, value_name = "PATH")]
    pub devices_dir: Option<PathBuf>,
}

impl Cli {
    /// Overlay command-line flags on a loaded config
    pub fn apply_to(&self, config: &mut LoggerConfig) {
        config.verbose |= self.verbose;
        config.quiet |= self.quiet;
        config.auto_modprobe |= self.modprobe;
        config.daily_rotation |= self.daily;
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(interval) = self.poll_interval {
            config.poll_interval_secs = interval;
        }
        if let Some(dir) = &self.devices_dir {
            config.devices_dir = dir.clone();
        }
    }

    /// Defaults, then config file, then flags; validated
    pub fn resolve_config(&self) -> Result<LoggerConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => load_system_config()?,
        };
        self.apply_to(&mut config);
        config.validate()?;
        Ok(config)
    }
}
