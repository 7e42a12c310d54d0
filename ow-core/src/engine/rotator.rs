//! CSV output files and their rotation
//!
//! # Rotation rules
//!
//! A new file is started when:
//! - no file is open yet
//! - the device roster differs from the one the open file was started with
//! - daily rotation is on and the local calendar day has changed
//!
//! Each file begins with a header naming its columns; the columns of an open
//! file never change.

use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use chrono::{DateTime, Local, NaiveDate};
use tracing::{debug, info};

use crate::constants::output;
use crate::data::{Roster, SampleSet};
use crate::error::{OnewireError, Result};

/// Why a new session was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationReason {
    NoSession,
    RosterChanged,
    DayChanged,
}

/// Result of a rotation check
#[derive(Debug)]
pub enum Rotation<'a> {
    /// Output is switched off
    Disabled,
    Kept(&'a mut OutputSession),
    Opened {
        reason: RotationReason,
        session: &'a mut OutputSession,
    },
}

impl<'a> Rotation<'a> {
    pub fn session(self) -> Option<&'a mut OutputSession> {
        match self {
            Rotation::Disabled => None,
            Rotation::Kept(session) | Rotation::Opened { session, .. } => Some(session),
        }
    }
}

/// One open CSV file with a fixed column roster
#[derive(Debug)]
pub struct OutputSession {
    path: PathBuf,
    writer: BufWriter<File>,
    roster: Roster,
    opened_on: NaiveDate,
    rows_written: u64,
}

impl OutputSession {
    /// Create parent directories, open for append and write the header
    pub fn open(path: &Path, roster: Roster, now: &DateTime<Local>) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dirs(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| OnewireError::file_write(path, e))?;

        let mut session = Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            roster,
            opened_on: now.date_naive(),
            rows_written: 0,
        };
        let header = header_line(&session.roster);
        session.write_line(&header)?;
        Ok(session)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn opened_on(&self) -> NaiveDate {
        self.opened_on
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Append one row for this session's columns and flush it
    ///
    /// A column whose device did not report this cycle is written as
    /// `no-data`. A roster change always rotates first, so this only happens
    /// when a device vanishes between the roster check and the write.
    pub fn write_row(&mut self, now: &DateTime<Local>, samples: &SampleSet) -> Result<()> {
        let line = row_line(now, &self.roster, samples);
        self.write_line(&line)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Flush and drop the file handle
    pub fn close(mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| OnewireError::file_write(&self.path, e))?;
        debug!(path = %self.path.display(), rows = self.rows_written, "Closed output file");
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer
            .write_all(line.as_bytes())
            .and_then(|_| self.writer.write_all(b"\r\n"))
            .and_then(|_| self.writer.flush())
            .map_err(|e| OnewireError::file_write(&self.path, e))
    }
}

/// Owns the (at most one) open output session
#[derive(Debug)]
pub struct OutputRotator {
    pattern: Option<String>,
    daily: bool,
    session: Option<OutputSession>,
}

impl OutputRotator {
    /// `pattern` of `None` (or empty) disables file output entirely
    pub fn new(pattern: Option<&str>, daily: bool) -> Self {
        Self {
            pattern: pattern.filter(|p| !p.is_empty()).map(str::to_string),
            daily,
            session: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.pattern.is_some()
    }

    pub fn session(&self) -> Option<&OutputSession> {
        self.session.as_ref()
    }

    /// Which rotation condition, if any, currently holds
    pub fn rotation_due(&self, roster: &Roster, now: &DateTime<Local>) -> Option<RotationReason> {
        match &self.session {
            None => Some(RotationReason::NoSession),
            Some(s) if s.roster() != roster => Some(RotationReason::RosterChanged),
            Some(s) if self.daily && s.opened_on() != now.date_naive() => {
                Some(RotationReason::DayChanged)
            }
            Some(_) => None,
        }
    }

    /// Open a new session if a rotation condition holds, else keep the current one
    pub fn maybe_rotate(&mut self, roster: &Roster, now: &DateTime<Local>) -> Result<Rotation<'_>> {
        let Some(pattern) = self.pattern.as_deref() else {
            return Ok(Rotation::Disabled);
        };

        let reason = self.rotation_due(roster, now);
        if let Some(reason) = reason {
            let path = resolve_output_path(pattern, now)?;
            self.close()?;
            info!(path = %path.display(), ?reason, "Opening output file");
            self.session = Some(OutputSession::open(&path, roster.clone(), now)?);
        }

        Ok(match (self.session.as_mut(), reason) {
            (Some(session), Some(reason)) => Rotation::Opened { reason, session },
            (Some(session), None) => Rotation::Kept(session),
            (None, _) => Rotation::Disabled,
        })
    }

    /// Close the open session, if any
    pub fn close(&mut self) -> Result<()> {
        match self.session.take() {
            Some(session) => session.close(),
            None => Ok(()),
        }
    }
}

/// Expand strftime placeholders; directories get the default basename
pub fn resolve_output_path(pattern: &str, now: &DateTime<Local>) -> Result<PathBuf> {
    let formatted = format_pattern(pattern, now)?;
    let path = PathBuf::from(&formatted);
    if formatted.ends_with(MAIN_SEPARATOR) || path.is_dir() {
        Ok(path.join(format_pattern(output::DEFAULT_BASENAME, now)?))
    } else {
        Ok(path)
    }
}

fn format_pattern(pattern: &str, now: &DateTime<Local>) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", now.format(pattern)).map_err(|_| {
        OnewireError::output_pattern(pattern, "contains an unsupported strftime specifier")
    })?;
    Ok(out)
}

fn create_dirs(dir: &Path) -> Result<()> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(source) => Err(OnewireError::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// `date,time,ts,<devices...>`
pub fn header_line(roster: &Roster) -> String {
    output::FIXED_COLUMNS
        .iter()
        .map(|c| csv_field(c))
        .chain(roster.iter().map(|d| csv_field(d)))
        .collect::<Vec<_>>()
        .join(",")
}

/// `YYYY-MM-DD,HH:MM:SS,<epoch>,<values...>`
pub fn row_line(now: &DateTime<Local>, roster: &Roster, samples: &SampleSet) -> String {
    let mut fields = vec![
        now.format(output::DATE_FORMAT).to_string(),
        now.format(output::TIME_FORMAT).to_string(),
        now.timestamp().to_string(),
    ];
    fields.extend(roster.iter().map(|d| csv_field(&samples.value_token(d))));
    fields.join(",")
}

/// Quote a field when it holds a delimiter, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
