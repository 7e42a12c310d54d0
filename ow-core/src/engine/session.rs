//! The logging loop
//!
//! One cycle: wait for the next slot, read every sensor, compare the roster,
//! rotate the output file if needed, append a row, report. All state lives in
//! `SessionLoop`; nothing is shared.

use std::path::PathBuf;
use std::thread;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::data::{LoggerConfig, Roster, SampleSet};
use crate::display::StatusReporter;
use crate::engine::rotator::{OutputRotator, Rotation, RotationReason};
use crate::engine::schedule::PollSchedule;
use crate::error::Result;
use crate::hw::SensorSource;

/// What happened during one poll cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub samples: SampleSet,
    pub roster_changed: bool,
    /// Set when a new output file was opened this cycle
    pub opened: Option<(RotationReason, PathBuf)>,
    pub row_written: bool,
}

pub struct SessionLoop<S: SensorSource> {
    source: S,
    schedule: PollSchedule,
    rotator: OutputRotator,
    reporter: StatusReporter,
    roster: Roster,
}

impl<S: SensorSource> SessionLoop<S> {
    pub fn new(
        source: S,
        schedule: PollSchedule,
        rotator: OutputRotator,
        reporter: StatusReporter,
    ) -> Self {
        Self {
            source,
            schedule,
            rotator,
            reporter,
            roster: Roster::default(),
        }
    }

    /// Build from a validated config
    pub fn from_config(source: S, config: &LoggerConfig) -> Self {
        Self::new(
            source,
            PollSchedule::new(config.poll_interval()),
            OutputRotator::new(config.output_pattern(), config.daily_rotation),
            StatusReporter::new(config.verbose, config.quiet),
        )
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn rotator(&self) -> &OutputRotator {
        &self.rotator
    }

    /// Poll forever; returns only on a fatal error
    pub fn run(&mut self) -> Result<()> {
        self.reporter.banner(self.schedule.interval());
        info!(
            interval_secs = self.schedule.interval().as_secs_f64(),
            output = self.rotator.is_enabled(),
            "Logging loop started"
        );

        loop {
            let delay = self.schedule.next_delay(SystemTime::now());
            debug!(delay_ms = delay.as_millis() as u64, "Sleeping until next slot");
            thread::sleep(delay);

            self.poll_cycle(Local::now())?;
        }
    }

    /// One poll / roster check / rotate / write / report pass at `now`
    pub fn poll_cycle(&mut self, now: DateTime<Local>) -> Result<CycleReport> {
        let samples = self.source.read_all()?;

        let roster = samples.roster();
        let roster_changed = roster != self.roster;
        if roster_changed {
            self.reporter.roster_changed(&now, &roster);
            info!(devices = %roster, "Device roster changed");
            self.roster = roster;
        }

        let mut opened = None;
        let mut row_written = false;
        let rotation = self.rotator.maybe_rotate(&self.roster, &now)?;
        if let Rotation::Opened { reason, session } = &rotation {
            self.reporter.writing_to(session.path());
            opened = Some((*reason, session.path().to_path_buf()));
        }
        if let Some(session) = rotation.session() {
            session.write_row(&now, &samples)?;
            row_written = true;
        }

        self.reporter.data(&now, &self.roster, &samples);
        self.reporter.flush();

        Ok(CycleReport {
            samples,
            roster_changed,
            opened,
            row_written,
        })
    }

    /// Flush and close the current output file
    pub fn shutdown(&mut self) -> Result<()> {
        self.rotator.close()
    }
}
