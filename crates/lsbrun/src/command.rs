//! The LSB action vocabulary recognised by the dispatcher.

use strum::{Display, EnumString, IntoStaticStr};

/// Init-script actions, parsed from their kebab-case keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Command {
    /// Start the service.
    Start,
    /// Stop the service.
    Stop,
    /// Stop and start the service.
    Restart,
    /// Restart the service only if it is enabled.
    TryRestart,
    /// Reload configuration if the service is enabled.
    Reload,
    /// Reload, or restart when reloading is unsupported, if enabled.
    ForceReload,
    /// Print the live service state.
    Status,
    /// Print the last recorded service state.
    CachedStatus,
}

impl Command {
    /// Every command, in the order shown by the usage line.
    pub const ALL: [Self; 8] = [
        Self::Start,
        Self::Stop,
        Self::Restart,
        Self::TryRestart,
        Self::Reload,
        Self::ForceReload,
        Self::Status,
        Self::CachedStatus,
    ];

    /// Returns true for commands that change service state.
    #[must_use]
    pub const fn requires_root(self) -> bool {
        !matches!(self, Self::Status | Self::CachedStatus)
    }

    /// Keyword as typed on the command line.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        self.into()
    }

    /// Renders `{start|stop|...}` for usage messages.
    #[must_use]
    pub fn synopsis() -> String {
        let keywords: Vec<&str> = Self::ALL.iter().map(|command| command.keyword()).collect();
        format!("{{{}}}", keywords.join("|"))
    }
}
