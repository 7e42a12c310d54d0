//! Constants and configuration values for Onewire Logger
//!
//! Centralizes all magic numbers, paths, and configuration defaults.
//! Never use magic numbers in other files - add them here first.

/// System paths
pub mod paths {
    /// Base directory of the 1-Wire bus; one subdirectory per device
    pub const W1_DEVICES_DIR: &str = "/sys/bus/w1/devices";

    /// Status file inside each device directory
    pub const W1_SLAVE_FILE: &str = "w1_slave";

    /// Present iff the thermometer kernel driver is loaded
    pub const W1_THERM_MODULE: &str = "/sys/module/w1_therm";

    /// System-wide configuration file (optional)
    pub const SYSTEM_CONFIG: &str = "/etc/onewire-log/config.json";
}

/// Sensor file parsing
pub mod sensor {
    /// Maximum number of bytes read from a single `w1_slave` file
    pub const MAX_READ_BYTES: u64 = 1024;

    /// Driver reports a good checksum
    pub const CRC_OK_PATTERN: &str = r" crc=.. YES";

    /// Temperature field in millidegrees Celsius
    pub const TEMPERATURE_PATTERN: &str = r"t=(-?[0-9]+)";

    /// Bus returned all ones: nothing answered
    pub const NO_RESPONSE_MARKER: &str = "ff ff ff ff ff ff ff ff ff";

    /// Millidegrees per degree
    pub const MILLIDEGREE_DIVISOR: i64 = 1000;
}

/// Tokens written in place of a temperature
pub mod tokens {
    pub const NO_DATA: &str = "no-data";
    pub const BAD_CRC: &str = "badcrc";
    pub const UNPARSEABLE: &str = "unparseable";
}

/// CSV output
pub mod output {
    /// Default output pattern (strftime placeholders, appended if exists)
    pub const DEFAULT_PATTERN: &str = "onewire_logs/w1_%Y%m%d_%H%M%S.csv";

    /// Basename used when the pattern resolves to a directory
    pub const DEFAULT_BASENAME: &str = "w1_%Y%m%d_%H%M%S.csv";

    /// Fixed leading columns of every file
    pub const FIXED_COLUMNS: [&str; 3] = ["date", "time", "ts"];

    pub const DATE_FORMAT: &str = "%Y-%m-%d";
    pub const TIME_FORMAT: &str = "%H:%M:%S";
    pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
}

/// Polling cadence
pub mod timing {
    /// Default poll interval in seconds
    pub const DEFAULT_POLL_INTERVAL_SECS: f64 = 30.0;

    /// Shortest sleep, as a fraction of the interval
    pub const MIN_DELAY_FACTOR: f64 = 0.25;

    /// Longest sleep, as a multiple of the interval
    pub const MAX_DELAY_FACTOR: f64 = 1.5;
}

/// Kernel driver loading
pub mod driver {
    pub const MODULE_NAME: &str = "w1_therm";
    pub const MODPROBE: &str = "modprobe";
    pub const ELEVATE: &str = "sudo";
}

/// Single-instance coordination
pub mod instance {
    use std::net::Ipv4Addr;

    /// UDP port claimed on loopback for the process lifetime
    pub const INSTANCE_PORT: u16 = 38417;

    pub const BIND_ADDR: Ipv4Addr = Ipv4Addr::LOCALHOST;
}

/// Environment variables
pub mod env {
    /// Log filter (EnvFilter syntax)
    pub const LOG_FILTER: &str = "ONEWIRE_LOG";

    pub const DEFAULT_LOG_FILTER: &str = "info";
}
