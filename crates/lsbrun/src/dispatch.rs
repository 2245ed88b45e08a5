//! The init-script command state machine.
//!
//! Residual arguments and missing or unknown commands are usage errors
//! (exit 2). `status` and `cached-status` are answered for every caller;
//! everything else passes a single root check (exit 4 when it fails) before
//! the service manager is consulted. `try-restart`, `reload`, and
//! `force-reload` only act on enabled services and report `<name> is down`
//! otherwise.

use thiserror::Error;
use tracing::{debug, info};

use crate::command::Command;
use crate::manager::{ManagerError, ServiceManager};
use crate::outcome::{LsbStatus, Outcome};
use crate::privilege::Privileges;
use crate::request::Request;
use crate::resolver::{RequestSource, ResolveError};
use crate::status::render_status;

/// Tracing target for dispatch decisions.
const DISPATCH_TARGET: &str = "lsbrun::dispatch";

/// Advisory printed when an unprivileged caller asks for live status.
pub const NOT_ROOT_NOTICE: &str = "Not a root, printing cached statuses\n";

/// Errors that abort dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request could not be resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// The service manager failed.
    #[error(transparent)]
    Manager(#[from] ManagerError),
    /// The service manager failed after the action line was begun.
    #[error("{source}")]
    Action {
        /// The `<Verb> <name>... ` prefix already committed to stdout.
        progress: String,
        /// The manager failure.
        #[source]
        source: ManagerError,
    },
}

impl DispatchError {
    /// Text to print on stdout before reporting the error.
    #[must_use]
    pub fn progress(&self) -> &str {
        match self {
            Self::Action { progress, .. } => progress,
            Self::Resolve(_) | Self::Manager(_) => "",
        }
    }
}

/// Routes requests to a [`ServiceManager`] under a privilege policy.
#[derive(Debug)]
pub struct Dispatcher<'a, M: ?Sized, P: ?Sized> {
    manager: &'a M,
    privileges: &'a P,
    stdout_is_terminal: bool,
}

impl<'a, M, P> Dispatcher<'a, M, P>
where
    M: ServiceManager + ?Sized,
    P: Privileges + ?Sized,
{
    /// Creates a dispatcher that renders plain, uncoloured status lines.
    pub const fn new(manager: &'a M, privileges: &'a P) -> Self {
        Self {
            manager,
            privileges,
            stdout_is_terminal: false,
        }
    }

    /// Enables colour when stdout is an interactive terminal.
    #[must_use]
    pub const fn with_terminal(mut self, stdout_is_terminal: bool) -> Self {
        self.stdout_is_terminal = stdout_is_terminal;
        self
    }

    /// Resolves the request from `source` and dispatches it.
    pub fn run<S>(&self, source: &S) -> Result<Outcome, DispatchError>
    where
        S: RequestSource + ?Sized,
    {
        let request = source.resolve()?;
        self.dispatch(request)
    }

    /// Dispatches an already resolved request.
    pub fn dispatch(&self, request: &Request) -> Result<Outcome, DispatchError> {
        let name = request.name();
        let raw = request.command();
        debug!(
            target: DISPATCH_TARGET,
            service = name,
            command = raw.unwrap_or_default(),
            "dispatching init-script command"
        );

        if !request.args().is_empty() {
            return Ok(unknown_command(raw.unwrap_or_default()));
        }
        let Some(raw) = raw else {
            return Ok(Outcome::failure(
                LsbStatus::InvalidArgument,
                format!("Usage: {name} {}\n", Command::synopsis()),
            ));
        };
        let Ok(command) = raw.parse::<Command>() else {
            return Ok(unknown_command(raw));
        };

        match command {
            Command::Status if self.privileges.is_root() => {
                self.status(name, false, Outcome::success())
            }
            Command::Status => {
                self.status(name, true, Outcome::success().with_stdout(NOT_ROOT_NOTICE))
            }
            Command::CachedStatus => self.status(name, true, Outcome::success()),
            _ if command.requires_root() && !self.privileges.is_root() => {
                info!(
                    target: DISPATCH_TARGET,
                    service = name,
                    %command,
                    "refusing unprivileged caller"
                );
                Ok(Outcome::failure(
                    LsbStatus::InsufficientPrivilege,
                    String::from("Permission denied\n"),
                ))
            }
            Command::Start => self.perform(name, "Starting", M::start),
            Command::Stop => self.perform(name, "Stopping", M::stop),
            Command::Restart => self.perform(name, "Restarting", M::restart),
            Command::TryRestart => self.perform_if_enabled(name, "Restarting", M::try_restart),
            Command::Reload => self.perform_if_enabled(name, "Reloading", M::reload),
            Command::ForceReload => self.perform_if_enabled(name, "Reloading", M::force_reload),
        }
    }

    fn status(
        &self,
        name: &str,
        cached: bool,
        mut outcome: Outcome,
    ) -> Result<Outcome, DispatchError> {
        let line = render_status(self.manager, name, cached, self.stdout_is_terminal)?;
        outcome.push_stdout(&line);
        Ok(outcome)
    }

    fn perform<F>(&self, name: &str, verb: &str, action: F) -> Result<Outcome, DispatchError>
    where
        F: FnOnce(&M, &str) -> Result<String, ManagerError>,
    {
        info!(
            target: DISPATCH_TARGET,
            service = name,
            verb,
            "delegating to service manager"
        );
        let progress = format!("{verb} {name}... ");
        match action(self.manager, name) {
            Ok(result) => Ok(Outcome::success().with_stdout(&format!("{progress}{result}\n"))),
            Err(source) => Err(DispatchError::Action { progress, source }),
        }
    }

    fn perform_if_enabled<F>(
        &self,
        name: &str,
        verb: &str,
        action: F,
    ) -> Result<Outcome, DispatchError>
    where
        F: FnOnce(&M, &str) -> Result<String, ManagerError>,
    {
        if !self.manager.is_enabled(name)? {
            return Ok(Outcome::success().with_stdout(&format!("{name} is down")));
        }
        self.perform(name, verb, action)
    }
}

fn unknown_command(command: &str) -> Outcome {
    Outcome::failure(
        LsbStatus::InvalidArgument,
        format!("Unknown command '{command}'\n"),
    )
}
