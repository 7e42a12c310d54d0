//! Core data types for Onewire Logger
//!
//! Readings, per-cycle sample sets and the device roster.

use std::collections::HashMap;
use std::fmt;

use crate::constants::{sensor::MILLIDEGREE_DIVISOR, tokens};

/// Temperature in thousandths of a degree Celsius, as reported by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MilliCelsius(pub i64);

impl fmt::Display for MilliCelsius {
    /// Always three decimals: `23562` -> `23.562`, `-500` -> `-0.500`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let divisor = MILLIDEGREE_DIVISOR as u64;
        write!(f, "{}{}.{:03}", sign, abs / divisor, abs % divisor)
    }
}

/// Why a sensor produced no temperature this cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    /// Bus returned all ones
    NoData,
    /// Checksum check failed
    BadCrc,
    /// Checksum ok but no usable temperature field
    Unparseable,
}

impl Fault {
    /// Token written to CSV and status lines
    pub fn token(self) -> &'static str {
        match self {
            Fault::NoData => tokens::NO_DATA,
            Fault::BadCrc => tokens::BAD_CRC,
            Fault::Unparseable => tokens::UNPARSEABLE,
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Classified content of one `w1_slave` file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingValue {
    Temperature(MilliCelsius),
    Fault(Fault),
}

impl fmt::Display for ReadingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadingValue::Temperature(t) => fmt::Display::fmt(t, f),
            ReadingValue::Fault(fault) => fmt::Display::fmt(fault, f),
        }
    }
}

/// One device's reading for one poll cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    pub device: String,
    pub value: ReadingValue,
}

/// All readings of one poll cycle, keyed by device identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleSet {
    readings: HashMap<String, Reading>,
}

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a reading, replacing any earlier one for the same device
    pub fn insert(&mut self, reading: Reading) {
        self.readings.insert(reading.device.clone(), reading);
    }

    pub fn get(&self, device: &str) -> Option<&Reading> {
        self.readings.get(device)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Sorted device identifiers present in this cycle
    pub fn roster(&self) -> Roster {
        Roster::new(self.readings.keys().cloned())
    }

    /// Rendered value for a column, `no-data` when the device did not answer
    pub fn value_token(&self, device: &str) -> String {
        self.get(device)
            .map(|r| r.value.to_string())
            .unwrap_or_else(|| tokens::NO_DATA.to_string())
    }
}

impl FromIterator<Reading> for SampleSet {
    fn from_iter<I: IntoIterator<Item = Reading>>(iter: I) -> Self {
        let mut set = SampleSet::new();
        for reading in iter {
            set.insert(reading);
        }
        set
    }
}

/// Sorted list of device identifiers; compared as an ordered sequence
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Roster(Vec<String>);

impl Roster {
    pub fn new<I, S>(devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = devices.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        Roster(names)
    }

    pub fn devices(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl fmt::Display for Roster {
    /// `a, b, c`, or `NONE` for an empty roster
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("NONE")
        } else {
            f.write_str(&self.0.join(", "))
        }
    }
}
