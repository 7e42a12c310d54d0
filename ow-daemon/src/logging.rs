//! Diagnostic logging setup
//!
//! Under systemd, diagnostics go to the journal; otherwise to stderr so
//! they never interleave with the status lines on stdout.

use std::path::Path;

use ow_core::constants::env;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const JOURNAL_SOCKET: &str = "/run/systemd/journal/socket";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Journald,
    Stderr,
}

impl LogTarget {
    pub fn describe(self) -> &'static str {
        match self {
            LogTarget::Journald => "systemd journal",
            LogTarget::Stderr => "stderr",
        }
    }
}

/// Filter directives from `ONEWIRE_LOG`, defaulting to `info`
pub fn log_filter() -> String {
    std::env::var(env::LOG_FILTER)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| env::DEFAULT_LOG_FILTER.to_string())
}

/// systemd sets JOURNAL_STREAM for services whose output it captures
fn under_systemd() -> bool {
    std::env::var_os("JOURNAL_STREAM").is_some() && Path::new(JOURNAL_SOCKET).exists()
}

pub fn init() -> LogTarget {
    let filter = log_filter();

    if under_systemd() {
        match tracing_journald::layer() {
            Ok(journald_layer) => {
                tracing_subscriber::registry()
                    .with(journald_layer)
                    .with(EnvFilter::new(&filter))
                    .init();
                return LogTarget::Journald;
            }
            Err(e) => {
                eprintln!("Failed to create journald layer: {}, falling back to stderr", e);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_env_filter(EnvFilter::new(&filter))
        .init();
    LogTarget::Stderr
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_default_filter() {
        std::env::remove_var(env::LOG_FILTER);
        assert_eq!(log_filter(), "info");
    }

    #[test]
    #[serial]
    fn test_filter_from_env() {
        std::env::set_var(env::LOG_FILTER, "debug,ow_core=trace");
        assert_eq!(log_filter(), "debug,ow_core=trace");
        std::env::remove_var(env::LOG_FILTER);
    }

    #[test]
    #[serial]
    fn test_blank_filter_uses_default() {
        std::env::set_var(env::LOG_FILTER, "  ");
        assert_eq!(log_filter(), "info");
        std::env::remove_var(env::LOG_FILTER);
    }
}
