//! Onewire Logger Core Library
//!
//! Samples 1-Wire thermometers through sysfs and appends their readings to
//! rotating CSV files.
//!
//! # Module Structure
//!
//! - `hw/` - sysfs sensor reading, kernel driver check, single-instance guard
//! - `data/` - readings, rosters, configuration
//! - `engine/` - poll cadence, output rotation, the logging loop
//!
//! # Example
//!
//! ```no_run
//! use ow_core::{LoggerConfig, SensorReader, SessionLoop};
//!
//! let config = LoggerConfig::default();
//! let reader = SensorReader::new(&config.devices_dir);
//! let mut logger = SessionLoop::from_config(reader, &config);
//! logger.run().unwrap();
//! ```

// Grouped modules
pub mod data;
pub mod engine;
pub mod hw;

// Standalone modules
pub mod constants;
pub mod display;
pub mod error;

pub use data::{
    load_config, load_system_config, validate_output_pattern, Fault, LoggerConfig, MilliCelsius,
    Reading, ReadingValue, Roster, SampleSet,
};

pub use error::{OnewireError, Result};

pub use engine::{
    CycleReport, OutputRotator, OutputSession, PollSchedule, Rotation, RotationReason, SessionLoop,
};

pub use hw::{
    ensure_driver_loaded, parse_reading, DriverStatus, InstanceGuard, ModuleLoader, SensorReader,
    SensorSource, SystemModuleLoader,
};

pub use display::StatusReporter;
