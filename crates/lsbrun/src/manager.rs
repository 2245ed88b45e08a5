//! The service-manager collaborator.
//!
//! [`ServiceManager`] is the seam between the dispatcher and whatever actually
//! supervises services. [`ProgramManager`] is the production adapter: it runs
//! an external program once per operation and reads its answer from stdout.

use std::ffi::OsString;
use std::io;
use std::process::{Command as Process, Output, Stdio};
use std::string::FromUtf8Error;

use lsbrun_config::Config;
use strum::{Display, IntoStaticStr};
use thiserror::Error;
use tracing::debug;

/// Tracing target for manager invocations.
const MANAGER_TARGET: &str = "lsbrun::manager";

/// Operations exposed by a service manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Operation {
    /// Administrative enablement check.
    IsEnabled,
    /// Live state probe.
    Status,
    /// Last recorded state.
    CachedStatus,
    /// Start the service.
    Start,
    /// Stop the service.
    Stop,
    /// Restart the service.
    Restart,
    /// Restart the service if it is running.
    TryRestart,
    /// Reload the service configuration.
    Reload,
    /// Reload the service, restarting when reload is unsupported.
    ForceReload,
}

impl Operation {
    /// Keyword passed to the manager program.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        self.into()
    }
}

/// Failures reported by a service manager.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// The manager program could not be started.
    #[error("failed to spawn service manager '{program}': {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying spawn error.
        #[source]
        source: io::Error,
    },
    /// The manager rejected or failed the operation.
    #[error("failed to {operation} {service}: {message}")]
    Failed {
        /// Operation that failed.
        operation: Operation,
        /// Service the operation targeted.
        service: String,
        /// Diagnostic supplied by the manager.
        message: String,
    },
    /// The manager answered with bytes that are not UTF-8.
    #[error("service manager returned non-UTF-8 output for {operation} {service}")]
    Output {
        /// Operation whose output was unreadable.
        operation: Operation,
        /// Service the operation targeted.
        service: String,
        /// Decoding failure.
        #[source]
        source: FromUtf8Error,
    },
}

/// Per-service operations the dispatcher delegates to.
///
/// Text results are rendered verbatim; errors are never caught by the
/// dispatcher.
pub trait ServiceManager {
    /// Returns whether the service is administratively enabled.
    fn is_enabled(&self, name: &str) -> Result<bool, ManagerError>;
    /// Probes the live state of the service.
    fn status(&self, name: &str) -> Result<String, ManagerError>;
    /// Returns the last recorded state without probing.
    fn cached_status(&self, name: &str) -> Result<String, ManagerError>;
    /// Starts the service.
    fn start(&self, name: &str) -> Result<String, ManagerError>;
    /// Stops the service.
    fn stop(&self, name: &str) -> Result<String, ManagerError>;
    /// Restarts the service.
    fn restart(&self, name: &str) -> Result<String, ManagerError>;
    /// Restarts the service if it is running.
    fn try_restart(&self, name: &str) -> Result<String, ManagerError>;
    /// Reloads the service.
    fn reload(&self, name: &str) -> Result<String, ManagerError>;
    /// Reloads the service, restarting it when reload is unsupported.
    fn force_reload(&self, name: &str) -> Result<String, ManagerError>;
}

/// Delegates each operation to `<program> <operation> <service>`.
///
/// A zero exit status means success and the trimmed stdout is the result.
/// For [`Operation::IsEnabled`], exit status `1` means disabled.
#[derive(Debug, Clone)]
pub struct ProgramManager {
    program: OsString,
}

impl ProgramManager {
    /// Creates an adapter for the given program.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Creates an adapter for the configured manager program.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.manager_program())
    }

    fn invoke(&self, operation: Operation, service: &str) -> Result<Output, ManagerError> {
        debug!(
            target: MANAGER_TARGET,
            program = %self.program.to_string_lossy(),
            %operation,
            service,
            "invoking service manager"
        );
        let output = Process::new(&self.program)
            .arg(operation.keyword())
            .arg(service)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ManagerError::Spawn {
                program: self.program.to_string_lossy().into_owned(),
                source,
            })?;
        debug!(
            target: MANAGER_TARGET,
            %operation,
            service,
            status = ?output.status.code(),
            "service manager exited"
        );
        Ok(output)
    }

    fn text(&self, operation: Operation, service: &str) -> Result<String, ManagerError> {
        let output = self.invoke(operation, service)?;
        if !output.status.success() {
            return Err(failure(operation, service, &output));
        }
        let stdout = String::from_utf8(output.stdout).map_err(|source| ManagerError::Output {
            operation,
            service: service.to_owned(),
            source,
        })?;
        Ok(stdout.trim().to_owned())
    }
}

fn failure(operation: Operation, service: &str, output: &Output) -> ManagerError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    let message = match (output.status.code(), stderr.is_empty()) {
        (Some(code), true) => format!("manager exited with status {code}"),
        (Some(code), false) => format!("manager exited with status {code}: {stderr}"),
        (None, true) => String::from("manager terminated by a signal"),
        (None, false) => format!("manager terminated by a signal: {stderr}"),
    };
    ManagerError::Failed {
        operation,
        service: service.to_owned(),
        message,
    }
}

impl ServiceManager for ProgramManager {
    fn is_enabled(&self, name: &str) -> Result<bool, ManagerError> {
        let output = self.invoke(Operation::IsEnabled, name)?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(failure(Operation::IsEnabled, name, &output)),
        }
    }

    fn status(&self, name: &str) -> Result<String, ManagerError> {
        self.text(Operation::Status, name)
    }

    fn cached_status(&self, name: &str) -> Result<String, ManagerError> {
        self.text(Operation::CachedStatus, name)
    }

    fn start(&self, name: &str) -> Result<String, ManagerError> {
        self.text(Operation::Start, name)
    }

    fn stop(&self, name: &str) -> Result<String, ManagerError> {
        self.text(Operation::Stop, name)
    }

    fn restart(&self, name: &str) -> Result<String, ManagerError> {
        self.text(Operation::Restart, name)
    }

    fn try_restart(&self, name: &str) -> Result<String, ManagerError> {
        self.text(Operation::TryRestart, name)
    }

    fn reload(&self, name: &str) -> Result<String, ManagerError> {
        self.text(Operation::Reload, name)
    }

    fn force_reload(&self, name: &str) -> Result<String, ManagerError> {
        self.text(Operation::ForceReload, name)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    /// Fake manager: echoes its arguments, treats `db` as disabled and
    /// fails every operation on `broken`.
    const SCRIPT: &str = r#"#!/bin/sh
case "$2" in
  broken) echo "cannot $1 $2" >&2; exit 3 ;;
esac
case "$1" in
  is-enabled) [ "$2" = "db" ] && exit 1; exit 0 ;;
  status) echo "running" ;;
  *) echo "  $1 $2 done  " ;;
esac
"#;

    struct FakeProgram {
        _dir: TempDir,
        path: PathBuf,
    }

    #[fixture]
    fn program() -> FakeProgram {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("manager");
        fs::write(&path, SCRIPT).expect("write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
        FakeProgram { _dir: dir, path }
    }

    #[rstest]
    fn trims_successful_output(program: FakeProgram) {
        let manager = ProgramManager::new(&program.path);
        assert_eq!(manager.start("web").expect("start"), "start web done");
        assert_eq!(
            manager.force_reload("web").expect("force-reload"),
            "force-reload web done"
        );
        assert_eq!(manager.status("web").expect("status"), "running");
    }

    #[rstest]
    #[case("web", true)]
    #[case("db", false)]
    fn maps_enablement_exit_codes(program: FakeProgram, #[case] name: &str, #[case] enabled: bool) {
        let manager = ProgramManager::new(&program.path);
        assert_eq!(manager.is_enabled(name).expect("is-enabled"), enabled);
    }

    #[rstest]
    fn reports_failures_with_manager_stderr(program: FakeProgram) {
        let manager = ProgramManager::new(&program.path);
        let error = manager.try_restart("broken").unwrap_err();
        assert!(matches!(
            error,
            ManagerError::Failed {
                operation: Operation::TryRestart,
                ..
            }
        ));
        assert_eq!(
            error.to_string(),
            "failed to try-restart broken: manager exited with status 3: cannot try-restart broken"
        );
    }

    #[rstest]
    fn enablement_errors_are_not_treated_as_disabled(program: FakeProgram) {
        let manager = ProgramManager::new(&program.path);
        assert!(manager.is_enabled("broken").is_err());
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let manager = ProgramManager::new("/nonexistent/lsbrun-manager");
        let error = manager.stop("web").unwrap_err();
        assert!(matches!(error, ManagerError::Spawn { .. }));
    }
}
