//! Status line rendering.
//!
//! One line per call: `<name>\t<state>\n`. On an interactive terminal the line
//! is green when the state is exactly `running` and red otherwise. Disabled
//! services short-circuit to an uncoloured `off` without asking the manager
//! for their state.

use crate::manager::{ManagerError, ServiceManager};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// State reported for administratively disabled services.
pub const DISABLED_STATE: &str = "off";
/// The only state rendered in green.
pub const RUNNING_STATE: &str = "running";

/// Renders the status line for `name`.
///
/// `cached` selects [`ServiceManager::cached_status`] over a live
/// [`ServiceManager::status`] probe.
pub fn render_status<M>(
    manager: &M,
    name: &str,
    cached: bool,
    stdout_is_terminal: bool,
) -> Result<String, ManagerError>
where
    M: ServiceManager + ?Sized,
{
    if !manager.is_enabled(name)? {
        return Ok(format!("{name}\t{DISABLED_STATE}\n"));
    }

    let state = if cached {
        manager.cached_status(name)?
    } else {
        manager.status(name)?
    };
    let line = format!("{name}\t{state}\n");
    if !stdout_is_terminal {
        return Ok(line);
    }

    let colour = if state == RUNNING_STATE { GREEN } else { RED };
    Ok(format!("{colour}{line}{RESET}"))
}
