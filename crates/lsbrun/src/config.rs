//! Configuration loading helpers for the init-script runtime.
//!
//! Leading configuration flags are separated from the init-script tokens so
//! that `ortho_config` only sees the flags it understands while the action
//! keyword and anything after it reach the dispatcher untouched.

use std::ffi::{OsStr, OsString};

use lsbrun_config::{Config, OrthoConfig};

use crate::AppError;

/// Flags recognised by the configuration loader.
///
/// Keep in sync with the fields of [`lsbrun_config::Config`].
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--log-filter",
    "--log-format",
    "--manager-program",
    "--init-dir",
];

pub(crate) trait ConfigLoader {
    /// Loads configuration from the filtered configuration arguments.
    ///
    /// Configuration flags must precede the action keyword; anything after
    /// the keyword is treated as an init-script argument.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

fn process_config_flag(argument: &OsStr) -> FlagAction {
    let argument_text = argument.to_string_lossy();
    let Some(flag) = argument_text
        .strip_prefix("--")
        .and_then(|_| argument_text.split('=').next())
    else {
        return FlagAction::Skip;
    };
    if CONFIG_CLI_FLAGS.contains(&flag) {
        return FlagAction::Include {
            needs_value: !argument_text.contains('='),
        };
    }
    FlagAction::Skip
}

/// Arguments destined for the loader and where the init-script tokens begin.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_start: usize,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some(invocation) = args.first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_start: 0,
        };
    };

    let mut config_arguments = vec![invocation.clone()];
    let mut pending_value = false;
    let mut command_start = 1;

    for argument in args.iter().skip(1) {
        if pending_value {
            pending_value = false;
        } else {
            match process_config_flag(argument) {
                FlagAction::Include { needs_value } => pending_value = needs_value,
                FlagAction::Skip => break,
            }
        }
        config_arguments.push(argument.clone());
        command_start += 1;
    }

    ConfigArgumentSplit {
        config_arguments,
        command_start,
    }
}

/// Rebuilds the argument vector without the configuration flags.
pub(crate) fn init_script_arguments(
    args: &[OsString],
    split: &ConfigArgumentSplit,
) -> Vec<OsString> {
    args.first()
        .into_iter()
        .chain(args.iter().skip(split.command_start))
        .cloned()
        .collect()
}
