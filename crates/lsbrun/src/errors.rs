//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::dispatch::DispatchError;
use crate::telemetry::TelemetryError;

/// Fatal errors; each one ends the process with exit status 1.
#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("failed to initialise logging: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("failed to write init-script output: {0}")]
    WriteOutput(#[source] io::Error),
}
