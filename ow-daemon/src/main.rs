//! Onewire Logger Daemon (onewire-logd)
//!
//! Samples every 1-Wire thermometer on a fixed cadence and appends the
//! readings to CSV files, rotating when the sensor set or the day changes.
//!
//! # Startup
//! - Resolve configuration (defaults, config file, flags)
//! - Claim the single-instance port; exit quietly if another logger holds it
//! - Check for the `w1_therm` driver, loading it on request
//! - Run the logging loop until killed
//!
//! # Exit codes
//! - `0`: killed by a signal, or another instance is already running
//! - `1`: driver missing, or a fatal I/O / configuration error
//! - `2`: usage error

mod cli;
mod logging;
mod startup;

use std::io;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};

use ow_core::constants::instance;
use ow_core::{SensorReader, SessionLoop, SystemModuleLoader};

use crate::cli::Cli;
use crate::startup::{Startup, StartupCheck};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> anyhow::Result<()> {
    // PHASE 1: Parse arguments and resolve configuration
    let cli = Cli::parse();
    let config = cli.resolve_config().context("invalid configuration")?;

    // PHASE 2: Diagnostics
    let target = logging::init();
    info!("STARTUP: onewire-logd {} starting", VERSION);
    info!("STARTUP: Logging to {}", target.describe());

    // PHASE 3: Single instance (held until the process exits), then the kernel driver
    let check = StartupCheck {
        port: instance::INSTANCE_PORT,
        module_path: &config.module_path,
        auto_load: config.auto_modprobe,
        loader: &SystemModuleLoader,
        quiet: config.quiet,
    };
    let _guard = match check.run(&mut io::stdout()).context("startup checks")? {
        Startup::Proceed(guard) => guard,
        stopped => match stopped.exit_code() {
            Some(code) if code != 0 => std::process::exit(code),
            _ => return Ok(()),
        },
    };

    // PHASE 4: Signals; rows are flushed as they are written
    if let Err(e) = ctrlc::set_handler(|| {
        info!("SIGNAL: Received SIGINT/SIGTERM - shutting down");
        std::process::exit(0);
    }) {
        warn!("Failed to set signal handler: {}. Default signal handling applies.", e);
    }

    info!(
        devices_dir = %config.devices_dir.display(),
        output = %config.output,
        daily = config.daily_rotation,
        "STARTUP: Configuration resolved"
    );

    // PHASE 5: Logging loop (only returns on error)
    let reader = SensorReader::new(&config.devices_dir);
    let mut session = SessionLoop::from_config(reader, &config);
    let result = session.run();

    if let Err(e) = &result {
        error!("Logging loop failed: {}", e);
        if let Err(close_err) = session.shutdown() {
            warn!("Failed to close output file: {}", close_err);
        }
    }
    result.context("logging loop failed")
}
