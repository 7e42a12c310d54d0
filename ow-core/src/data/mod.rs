//! Data types and configuration modules
//!
//! Contains all core data structures and configuration management.

mod config;
mod types;

pub use config::{load_config, load_system_config, validate_output_pattern, LoggerConfig};
pub use types::{Fault, MilliCelsius, Reading, ReadingValue, Roster, SampleSet};
