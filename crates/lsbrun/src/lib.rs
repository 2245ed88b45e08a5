//! LSB init-script front end for an external service manager.
//!
//! The binary is meant to be symlinked as `/etc/init.d/<service>`: the
//! service name comes from the invocation path and the action keyword from the
//! first argument. The same machinery is available as a library through
//! [`Dispatcher`], which turns a [`Request`] into an [`Outcome`] holding the
//! text to print and the LSB exit status.
//!
//! ```rust
//! use lsbrun::{Dispatcher, LsbStatus, ManagerError, Request, ServiceManager, StaticPrivileges};
//!
//! struct AlwaysUp;
//!
//! impl ServiceManager for AlwaysUp {
//!     fn is_enabled(&self, _name: &str) -> Result<bool, ManagerError> { Ok(true) }
//!     fn status(&self, _name: &str) -> Result<String, ManagerError> { Ok("running".into()) }
//!     fn cached_status(&self, _name: &str) -> Result<String, ManagerError> { Ok("running".into()) }
//!     fn start(&self, _name: &str) -> Result<String, ManagerError> { Ok("started".into()) }
//!     fn stop(&self, _name: &str) -> Result<String, ManagerError> { Ok("stopped".into()) }
//!     fn restart(&self, _name: &str) -> Result<String, ManagerError> { Ok("restarted".into()) }
//!     fn try_restart(&self, _name: &str) -> Result<String, ManagerError> { Ok("restarted".into()) }
//!     fn reload(&self, _name: &str) -> Result<String, ManagerError> { Ok("reloaded".into()) }
//!     fn force_reload(&self, _name: &str) -> Result<String, ManagerError> { Ok("reloaded".into()) }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let request = Request::builder("web").command("start").build()?;
//! let outcome = Dispatcher::new(&AlwaysUp, &StaticPrivileges::root()).dispatch(&request)?;
//! assert_eq!(outcome.stdout(), "Starting web... started\n");
//! assert_eq!(outcome.status(), LsbStatus::Success);
//! # Ok(())
//! # }
//! ```

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use lsbrun_config::Config;
use tracing::debug;

mod command;
mod config;
mod dispatch;
mod errors;
mod manager;
mod outcome;
mod privilege;
mod request;
mod resolver;
mod status;
pub mod telemetry;

pub use command::Command;
use config::{ConfigLoader, OrthoConfigLoader, init_script_arguments, split_config_arguments};
pub use dispatch::{DispatchError, Dispatcher, NOT_ROOT_NOTICE};
pub(crate) use errors::AppError;
pub use manager::{ManagerError, Operation, ProgramManager, ServiceManager};
pub use outcome::{LsbStatus, Outcome};
pub use privilege::{EffectiveUser, Privileges, StaticPrivileges};
pub use request::{Request, RequestBuilder, RequestError};
pub use resolver::{InitScriptPattern, ProcessRequest, RequestCell, RequestSource, ResolveError};
pub use status::{DISABLED_STATE, RUNNING_STATE, render_status};

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
    stdout_is_terminal: bool,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) fn new(stdout: &'a mut W, stderr: &'a mut E, stdout_is_terminal: bool) -> Self {
        Self {
            stdout,
            stderr,
            stdout_is_terminal,
        }
    }
}

struct CliRunner<'a, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
    cell: &'a RequestCell,
}

impl<'a, W, E, L> CliRunner<'a, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    fn new(io: &'a mut IoStreams<'a, W, E>, loader: &'a L, cell: &'a RequestCell) -> Self {
        Self { io, loader, cell }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        self.run_with(args, ProgramManager::from_config, &EffectiveUser)
    }

    fn run_with<I, M, P, F>(&mut self, args: I, build_manager: F, privileges: &P) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
        M: ServiceManager,
        P: Privileges,
        F: FnOnce(&Config) -> M,
    {
        match self.try_run(args, build_manager, privileges) {
            Ok(exit_code) => exit_code,
            Err(error) => {
                debug!(target: "lsbrun::runtime", %error, "init script failed");
                let _ = writeln!(self.io.stderr, "{error}");
                ExitCode::FAILURE
            }
        }
    }

    fn try_run<I, M, P, F>(
        &mut self,
        args: I,
        build_manager: F,
        privileges: &P,
    ) -> Result<ExitCode, AppError>
    where
        I: IntoIterator<Item = OsString>,
        M: ServiceManager,
        P: Privileges,
        F: FnOnce(&Config) -> M,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);
        let config = self.loader.load(&split.config_arguments)?;
        telemetry::initialise(&config)?;

        let manager = build_manager(&config);
        let source = ProcessRequest::new(
            self.cell,
            InitScriptPattern::from_config(&config),
            init_script_arguments(&args, &split),
        );
        let dispatched = Dispatcher::new(&manager, privileges)
            .with_terminal(self.io.stdout_is_terminal)
            .run(&source);
        let outcome = match dispatched {
            Ok(outcome) => outcome,
            Err(error) => {
                self.io
                    .stdout
                    .write_all(error.progress().as_bytes())
                    .and_then(|()| self.io.stdout.flush())
                    .map_err(AppError::WriteOutput)?;
                return Err(error.into());
            }
        };
        outcome
            .write_to(&mut *self.io.stdout, &mut *self.io.stderr)
            .map_err(AppError::WriteOutput)?;
        Ok(outcome.status().into())
    }
}

/// Runs the init script using the process-wide request cell.
///
/// `args` is the full argument vector including the invocation path.
#[must_use]
pub fn run<I, W, E>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    stdout_is_terminal: bool,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr, stdout_is_terminal);
    CliRunner::new(&mut io, &OrthoConfigLoader, RequestCell::process()).run(args)
}

#[cfg(test)]
pub(crate) fn run_with_collaborators<'a, I, W, E, L, M, P>(
    args: I,
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
    cell: &'a RequestCell,
    manager: M,
    privileges: &P,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
    M: ServiceManager,
    P: Privileges,
{
    CliRunner::new(io, loader, cell).run_with(args, |_| manager, privileges)
}
