//! Status line formatting
//!
//! Human-readable lines printed to stdout while the logger runs. Diagnostics
//! go through `tracing` instead; these are what an operator watching the
//! terminal sees.

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::constants::output;
use crate::data::{Roster, SampleSet};

/// `Polling one-wire devices every 30.0 seconds`
pub fn format_banner(interval: Duration) -> String {
    format!(
        "Polling one-wire devices every {:.1} seconds",
        interval.as_secs_f64()
    )
}

/// `2026-03-14 09:26:53 Active devices are: 28-a, 28-b`
pub fn format_roster_change(now: &DateTime<Local>, roster: &Roster) -> String {
    format!(
        "{} Active devices are: {}",
        now.format(output::DATETIME_FORMAT),
        roster
    )
}

/// `09:26:53 DATA 21.500 no-data`
pub fn format_data_line(now: &DateTime<Local>, roster: &Roster, samples: &SampleSet) -> String {
    let values = if roster.is_empty() {
        "no data".to_string()
    } else {
        roster
            .iter()
            .map(|d| samples.value_token(d))
            .collect::<Vec<_>>()
            .join(" ")
    };
    format!("{} DATA {}", now.format(output::TIME_FORMAT), values)
}

pub fn format_writing_to(path: &Path) -> String {
    format!("Writing data to {}", path.display())
}

/// Prints status lines according to the verbose / quiet flags
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusReporter {
    verbose: bool,
    quiet: bool,
}

impl StatusReporter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Informational line, suppressed in quiet mode
    pub fn notice(&self, line: &str) {
        if !self.quiet {
            println!("{}", line);
        }
    }

    pub fn banner(&self, interval: Duration) {
        self.notice(&format_banner(interval));
    }

    pub fn roster_changed(&self, now: &DateTime<Local>, roster: &Roster) {
        self.notice(&format_roster_change(now, roster));
    }

    pub fn writing_to(&self, path: &Path) {
        self.notice(&format_writing_to(path));
    }

    /// Per-cycle readings, printed only in verbose mode
    pub fn data(&self, now: &DateTime<Local>, roster: &Roster, samples: &SampleSet) {
        if self.verbose {
            println!("{}", format_data_line(now, roster, samples));
        }
    }

    pub fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Fault, MilliCelsius, Reading, ReadingValue};
    use chrono::TimeZone;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).single().unwrap()
    }

    #[test]
    fn test_banner() {
        assert_eq!(
            format_banner(Duration::from_secs(30)),
            "Polling one-wire devices every 30.0 seconds"
        );
        assert_eq!(
            format_banner(Duration::from_millis(2500)),
            "Polling one-wire devices every 2.5 seconds"
        );
    }

    #[test]
    fn test_roster_change_line() {
        assert_eq!(
            format_roster_change(&now(), &Roster::new(["28-b", "28-a"])),
            "2026-03-14 09:26:53 Active devices are: 28-a, 28-b"
        );
        assert_eq!(
            format_roster_change(&now(), &Roster::default()),
            "2026-03-14 09:26:53 Active devices are: NONE"
        );
    }

    #[test]
    fn test_data_line() {
        let samples: SampleSet = vec![
            Reading {
                device: "28-a".into(),
                value: ReadingValue::Temperature(MilliCelsius(21500)),
            },
            Reading {
                device: "28-b".into(),
                value: ReadingValue::Fault(Fault::BadCrc),
            },
        ]
        .into_iter()
        .collect();
        let roster = Roster::new(["28-a", "28-b", "28-c"]);
        assert_eq!(
            format_data_line(&now(), &roster, &samples),
            "09:26:53 DATA 21.500 badcrc no-data"
        );
        assert_eq!(
            format_data_line(&now(), &Roster::default(), &samples),
            "09:26:53 DATA no data"
        );
    }
}
