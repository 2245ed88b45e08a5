//! Effective-user checks for the privilege gate.

/// Answers whether the caller may run state-changing commands.
pub trait Privileges {
    /// Returns true when the effective user is root.
    fn is_root(&self) -> bool;
}

/// Reads the effective user id of the running process.
#[derive(Debug, Default, Clone, Copy)]
pub struct EffectiveUser;

impl Privileges for EffectiveUser {
    #[cfg(unix)]
    fn is_root(&self) -> bool {
        nix::unistd::geteuid().is_root()
    }

    #[cfg(not(unix))]
    fn is_root(&self) -> bool {
        false
    }
}

/// Fixed answer, for embedding callers that already know the privilege level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticPrivileges {
    root: bool,
}

impl StaticPrivileges {
    /// Caller is root.
    #[must_use]
    pub const fn root() -> Self {
        Self { root: true }
    }

    /// Caller is an ordinary user.
    #[must_use]
    pub const fn unprivileged() -> Self {
        Self { root: false }
    }
}

impl Privileges for StaticPrivileges {
    fn is_root(&self) -> bool {
        self.root
    }
}
