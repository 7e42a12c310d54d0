//! Thermometer kernel driver presence and loading

use std::path::Path;
use std::process::Command;

use tracing::{info, warn};

use crate::constants::driver;
use crate::error::{OnewireError, Result};

/// Outcome of the driver check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    Loaded,
    Missing,
}

/// Something that can ask the kernel to load the thermometer module
#[cfg_attr(test, mockall::automock)]
pub trait ModuleLoader {
    /// Human-readable command, shown when auto-loading is off
    fn command_line(&self) -> String;

    fn load(&self) -> Result<()>;
}

/// Runs `modprobe w1_therm`, through `sudo` unless already root
#[derive(Debug, Clone, Default)]
pub struct SystemModuleLoader;

impl SystemModuleLoader {
    fn needs_elevation(&self) -> bool {
        // SAFETY: geteuid is always safe - it just returns the effective user ID of the process.
        unsafe { libc::geteuid() != 0 }
    }

    fn command(&self) -> Command {
        if self.needs_elevation() {
            let mut cmd = Command::new(driver::ELEVATE);
            cmd.args([driver::MODPROBE, driver::MODULE_NAME]);
            cmd
        } else {
            let mut cmd = Command::new(driver::MODPROBE);
            cmd.arg(driver::MODULE_NAME);
            cmd
        }
    }
}

impl ModuleLoader for SystemModuleLoader {
    fn command_line(&self) -> String {
        format!("{} {} {}", driver::ELEVATE, driver::MODPROBE, driver::MODULE_NAME)
    }

    fn load(&self) -> Result<()> {
        let output = self
            .command()
            .output()
            .map_err(|e| OnewireError::ModuleLoad(format!("could not run modprobe: {}", e)))?;
        if output.status.success() {
            Ok(())
        } else {
            Err(OnewireError::ModuleLoad(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))
        }
    }
}

/// Check for the driver, optionally loading it once
///
/// Success of the loader is never trusted: the module path is checked again
/// after the attempt.
pub fn ensure_driver_loaded(
    module_path: &Path,
    auto_load: bool,
    loader: &dyn ModuleLoader,
) -> DriverStatus {
    let mut attempted = false;
    loop {
        if module_path.exists() {
            return DriverStatus::Loaded;
        }
        if attempted {
            warn!(path = %module_path.display(), "Thermometer module still not loaded");
            return DriverStatus::Missing;
        }

        warn!("Thermometer module not loaded");
        if !auto_load {
            warn!("Run this command to load module: {}", loader.command_line());
            return DriverStatus::Missing;
        }

        info!("Loading module");
        if let Err(e) = loader.load() {
            warn!("Module load failed: {}", e);
        }
        attempted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_already_loaded() {
        let tmp = TempDir::new().unwrap();
        let mut loader = MockModuleLoader::new();
        loader.expect_load().never();

        assert_eq!(ensure_driver_loaded(tmp.path(), true, &loader), DriverStatus::Loaded);
    }

    #[test]
    fn test_missing_without_auto_load() {
        let tmp = TempDir::new().unwrap();
        let module = tmp.path().join("w1_therm");
        let mut loader = MockModuleLoader::new();
        loader
            .expect_command_line()
            .times(1)
            .return_const("sudo modprobe w1_therm".to_string());
        loader.expect_load().never();

        assert_eq!(ensure_driver_loaded(&module, false, &loader), DriverStatus::Missing);
    }

    #[test]
    fn test_auto_load_succeeds() {
        let tmp = TempDir::new().unwrap();
        let module = tmp.path().join("w1_therm");
        let created = module.clone();
        let mut loader = MockModuleLoader::new();
        loader.expect_load().times(1).returning(move || {
            fs::create_dir_all(&created).unwrap();
            Ok(())
        });

        assert_eq!(ensure_driver_loaded(&module, true, &loader), DriverStatus::Loaded);
    }

    #[test]
    fn test_auto_load_retries_only_once() {
        let tmp = TempDir::new().unwrap();
        let module = tmp.path().join("w1_therm");
        let mut loader = MockModuleLoader::new();
        loader
            .expect_load()
            .times(1)
            .returning(|| Err(OnewireError::ModuleLoad("not permitted".into())));

        assert_eq!(ensure_driver_loaded(&module, true, &loader), DriverStatus::Missing);
    }

    #[test]
    fn test_system_loader_command_line() {
        assert_eq!(SystemModuleLoader.command_line(), "sudo modprobe w1_therm");
    }
}
