//! Shared configuration for the `lsbrun` init-script dispatcher.
//!
//! Values are layered the usual `ortho_config` way: built-in defaults, then a
//! configuration file (`--config-path` or `LSBRUN_CONFIG_PATH`), then
//! `LSBRUN_*` environment variables, then command-line flags.

mod defaults;
mod logging;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_INIT_DIR, DEFAULT_LOG_FILTER, DEFAULT_MANAGER_PROGRAM, default_init_dir,
    default_log_filter, default_log_filter_string, default_log_format, default_manager_program,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use ortho_config::OrthoConfig;

/// Resolved configuration for one `lsbrun` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "LSBRUN")]
pub struct Config {
    /// Tracing filter expression applied to stderr logging.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format of log records.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Program invoked as `<program> <operation> <service>`.
    #[serde(default = "default_manager_program")]
    #[ortho_config(default = default_manager_program())]
    pub manager_program: String,
    /// Directory whose entries name the services being controlled.
    #[serde(default = "default_init_dir")]
    #[ortho_config(default = default_init_dir())]
    pub init_dir: Utf8PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            manager_program: default_manager_program(),
            init_dir: default_init_dir(),
        }
    }
}

impl Config {
    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log record format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Program that performs service operations.
    #[must_use]
    pub fn manager_program(&self) -> &str {
        &self.manager_program
    }

    /// Init-script directory.
    #[must_use]
    pub fn init_dir(&self) -> &Utf8Path {
        &self.init_dir
    }
}
