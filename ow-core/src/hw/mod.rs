//! Hardware and host interaction modules
//!
//! Contains the sysfs sensor reader, the kernel driver check and the
//! single-instance guard.

mod driver;
mod instance;
mod sensors;

pub use driver::{ensure_driver_loaded, DriverStatus, ModuleLoader, SystemModuleLoader};
pub use instance::InstanceGuard;
pub use sensors::{parse_reading, SensorReader, SensorSource};

#[cfg(test)]
pub use sensors::MockSensorSource;
