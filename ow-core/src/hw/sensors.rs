//! 1-Wire thermometer enumeration and parsing
//!
//! Every device on the bus appears as a directory under
//! `/sys/bus/w1/devices`; thermometers expose a `w1_slave` file whose
//! content looks like:
//!
//! ```text
//! 72 01 4b 46 7f ff 0e 10 57 : crc=57 YES
//! 72 01 4b 46 7f ff 0e 10 57 t=23125
//! ```
//!
//! The first line carries the driver's checksum verdict, the second the
//! temperature in millidegrees Celsius.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, trace, warn};

use crate::constants::{paths, sensor};
use crate::data::{Fault, MilliCelsius, Reading, ReadingValue, SampleSet};
use crate::error::{OnewireError, Result};

fn crc_ok_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(sensor::CRC_OK_PATTERN).expect("valid CRC pattern"))
}

fn temperature_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(sensor::TEMPERATURE_PATTERN).expect("valid temperature pattern"))
}

/// Anything that can produce one cycle's worth of readings
#[cfg_attr(test, mockall::automock)]
pub trait SensorSource {
    fn read_all(&self) -> Result<SampleSet>;
}

/// Reads every thermometer below a 1-Wire devices directory
#[derive(Debug, Clone)]
pub struct SensorReader {
    devices_dir: PathBuf,
}

impl Default for SensorReader {
    fn default() -> Self {
        Self::new(paths::W1_DEVICES_DIR)
    }
}

impl SensorReader {
    pub fn new(devices_dir: impl Into<PathBuf>) -> Self {
        Self {
            devices_dir: devices_dir.into(),
        }
    }

    pub fn devices_dir(&self) -> &Path {
        &self.devices_dir
    }

    /// `<devices_dir>/*/w1_slave`, sorted by path
    ///
    /// A missing devices directory means an empty bus, not an error.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.devices_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(dir = %self.devices_dir.display(), "1-Wire devices directory not present");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(OnewireError::DirectoryList {
                    path: self.devices_dir.clone(),
                    source,
                })
            }
        };

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| OnewireError::DirectoryList {
                path: self.devices_dir.clone(),
                source,
            })?;
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let candidate = entry.path().join(paths::W1_SLAVE_FILE);
            // lstat: a dangling link still counts as discovered
            if candidate.symlink_metadata().is_ok() {
                found.push(candidate);
            }
        }
        found.sort();
        trace!(count = found.len(), "Discovered w1_slave files");
        Ok(found)
    }

    /// Read and classify every discovered sensor
    pub fn read_all(&self) -> Result<SampleSet> {
        let mut samples = SampleSet::new();

        for path in self.discover()? {
            let Some(device) = device_name(&path) else {
                continue;
            };

            let content = match read_limited(&path) {
                Ok(content) => content,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!(path = %path.display(), "File disappeared");
                    continue;
                }
                Err(source) => return Err(OnewireError::file_read(&path, source)),
            };

            let value = parse_reading(&content);
            match value {
                ReadingValue::Temperature(t) => trace!(device = %device, temp = %t, "Read sensor"),
                ReadingValue::Fault(Fault::NoData) => {
                    warn!(device = %device, "No response from sensor")
                }
                ReadingValue::Fault(Fault::BadCrc) => {
                    warn!(device = %device, "Invalid CRC from sensor")
                }
                ReadingValue::Fault(Fault::Unparseable) => {
                    warn!(device = %device, content = ?content, "Cannot find temperature in sensor output")
                }
            }
            samples.insert(Reading { device, value });
        }

        Ok(samples)
    }
}

impl SensorSource for SensorReader {
    fn read_all(&self) -> Result<SampleSet> {
        SensorReader::read_all(self)
    }
}

/// Device identifier: the directory holding the `w1_slave` file
fn device_name(path: &Path) -> Option<String> {
    path.parent()
        .and_then(|dir| dir.file_name())
        .map(|name| name.to_string_lossy().into_owned())
}

fn read_limited(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    let mut buf = Vec::new();
    file.take(sensor::MAX_READ_BYTES).read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Classify raw `w1_slave` content
pub fn parse_reading(content: &str) -> ReadingValue {
    if !crc_ok_regex().is_match(content) {
        return if content.contains(sensor::NO_RESPONSE_MARKER) {
            ReadingValue::Fault(Fault::NoData)
        } else {
            ReadingValue::Fault(Fault::BadCrc)
        };
    }

    temperature_regex()
        .captures(content)
        .and_then(|caps| caps[1].parse::<i64>().ok())
        .map(|milli| ReadingValue::Temperature(MilliCelsius(milli)))
        .unwrap_or(ReadingValue::Fault(Fault::Unparseable))
}
