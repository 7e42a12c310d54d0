//! Startup checks
//!
//! The instance guard comes first so a second logger never touches the
//! driver, sensors or output files. The driver check follows.

use std::io::Write;
use std::path::Path;

use tracing::{error, info};

use ow_core::{ensure_driver_loaded, DriverStatus, InstanceGuard, ModuleLoader};
use ow_error::Result;

pub const ALREADY_RUNNING: &str = "Another instance is already running";

/// Outcome of the instance and driver checks
#[derive(Debug)]
pub enum Startup {
    /// Hold the guard for the rest of the process
    Proceed(InstanceGuard),
    AlreadyRunning,
    DriverMissing,
}

impl Startup {
    /// Exit code when startup stops here, `None` when logging should begin
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Startup::Proceed(_) => None,
            Startup::AlreadyRunning => Some(0),
            Startup::DriverMissing => Some(1),
        }
    }
}

pub struct StartupCheck<'a> {
    pub port: u16,
    pub module_path: &'a Path,
    pub auto_load: bool,
    pub loader: &'a dyn ModuleLoader,
    pub quiet: bool,
}

impl StartupCheck<'_> {
    /// Claim the instance port, then make sure the driver is present
    ///
    /// The "already running" notice goes to `out` unless quiet.
    pub fn run(&self, out: &mut dyn Write) -> Result<Startup> {
        let Some(guard) = InstanceGuard::acquire(self.port)? else {
            info!(port = self.port, "Another instance holds the instance port, exiting");
            if !self.quiet {
                let _ = writeln!(out, "{}", ALREADY_RUNNING);
            }
            return Ok(Startup::AlreadyRunning);
        };

        if ensure_driver_loaded(self.module_path, self.auto_load, self.loader)
            == DriverStatus::Missing
        {
            error!("Thermometer driver unavailable, exiting");
            return Ok(Startup::DriverMissing);
        }

        Ok(Startup::Proceed(guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use ow_error::OnewireError;
    use tempfile::TempDir;

    mock! {
        Loader {}
        impl ModuleLoader for Loader {
            fn command_line(&self) -> String;
            fn load(&self) -> ow_error::Result<()>;
        }
    }

    fn idle_loader() -> MockLoader {
        let mut loader = MockLoader::new();
        loader.expect_load().never();
        loader.expect_command_line().never();
        loader
    }

    fn check<'a>(
        port: u16,
        module_path: &'a Path,
        auto_load: bool,
        loader: &'a MockLoader,
        quiet: bool,
    ) -> StartupCheck<'a> {
        StartupCheck {
            port,
            module_path,
            auto_load,
            loader,
            quiet,
        }
    }

    #[test]
    fn test_second_instance_exits_zero_with_notice() {
        let driver = TempDir::new().unwrap();
        let held = InstanceGuard::acquire(0).unwrap().unwrap();
        let port = held.local_addr().unwrap().port();
        let loader = idle_loader();

        let mut out = Vec::new();
        let outcome = check(port, driver.path(), false, &loader, false)
            .run(&mut out)
            .unwrap();

        assert!(matches!(outcome, Startup::AlreadyRunning));
        assert_eq!(outcome.exit_code(), Some(0));
        assert_eq!(String::from_utf8(out).unwrap(), "Another instance is already running\n");
    }

    #[test]
    fn test_second_instance_quiet_prints_nothing() {
        let driver = TempDir::new().unwrap();
        let held = InstanceGuard::acquire(0).unwrap().unwrap();
        let port = held.local_addr().unwrap().port();
        let loader = idle_loader();

        let mut out = Vec::new();
        let outcome = check(port, driver.path(), false, &loader, true)
            .run(&mut out)
            .unwrap();

        assert_eq!(outcome.exit_code(), Some(0));
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_driver_exits_one() {
        let tmp = TempDir::new().unwrap();
        let module = tmp.path().join("w1_therm");
        let mut loader = MockLoader::new();
        loader.expect_load().never();
        loader
            .expect_command_line()
            .times(1)
            .return_const("sudo modprobe w1_therm".to_string());

        let mut out = Vec::new();
        let outcome = check(0, &module, false, &loader, false).run(&mut out).unwrap();

        assert!(matches!(outcome, Startup::DriverMissing));
        assert_eq!(outcome.exit_code(), Some(1));
        assert!(out.is_empty());
    }

    #[test]
    fn test_failed_auto_load_exits_one() {
        let tmp = TempDir::new().unwrap();
        let module = tmp.path().join("w1_therm");
        let mut loader = MockLoader::new();
        loader
            .expect_load()
            .times(1)
            .returning(|| Err(OnewireError::ModuleLoad("Operation not permitted".into())));

        let mut out = Vec::new();
        let outcome = check(0, &module, true, &loader, false).run(&mut out).unwrap();

        assert_eq!(outcome.exit_code(), Some(1));
    }

    #[test]
    fn test_proceeds_and_holds_the_port() {
        let driver = TempDir::new().unwrap();
        let loader = idle_loader();

        let mut out = Vec::new();
        let outcome = check(0, driver.path(), false, &loader, false)
            .run(&mut out)
            .unwrap();
        assert_eq!(outcome.exit_code(), None);

        let Startup::Proceed(guard) = outcome else {
            panic!("expected startup to proceed");
        };
        let port = guard.local_addr().unwrap().port();
        assert!(InstanceGuard::acquire(port).unwrap().is_none());
    }
}
