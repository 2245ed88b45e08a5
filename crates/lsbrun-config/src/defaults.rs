//! Default values shared by the configuration layers.

use camino::Utf8PathBuf;

/// Default log filter expression.
///
/// Init scripts are read by operators and parsed by other tools, so only
/// warnings and errors reach stderr unless the filter is raised.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Program the binary delegates service operations to.
pub const DEFAULT_MANAGER_PROGRAM: &str = "lsbrun-manager";

/// Directory init-script symlinks are expected to live in.
pub const DEFAULT_INIT_DIR: &str = "/etc/init.d";

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Compact
}

/// Owned manager program name.
#[must_use]
pub fn default_manager_program() -> String {
    DEFAULT_MANAGER_PROGRAM.to_owned()
}

/// Default init-script directory.
#[must_use]
pub fn default_init_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_INIT_DIR)
}
