//! Request resolution.
//!
//! The dispatcher consumes any [`RequestSource`]. Two sources exist:
//! an explicitly constructed [`Request`], which resolves to itself, and
//! [`ProcessRequest`], which derives the request from the invocation path and
//! argument vector of an init script and caches it in a [`RequestCell`].

use std::ffi::{OsStr, OsString};

use camino::{Utf8Path, Utf8PathBuf};
use lsbrun_config::Config;
use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::debug;

use crate::request::{Request, RequestError};

/// Tracing target for request resolution.
const RESOLVE_TARGET: &str = "lsbrun::resolver";

static PROCESS_REQUEST: RequestCell = RequestCell::new();

/// Errors raised while resolving a request.
///
/// These indicate packaging or programming mistakes and are fatal.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No invocation path was available.
    #[error("the process was started without an invocation path")]
    MissingInvocation,
    /// The invocation path does not look like `<init_dir>/<service>`.
    #[error("invocation path '{path}' does not match '{init_dir}/<service>'")]
    InvocationPath {
        /// Path the process was started as.
        path: String,
        /// Directory init scripts are expected in.
        init_dir: Utf8PathBuf,
    },
    /// The derived request was invalid.
    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Anything the dispatcher can obtain a [`Request`] from.
pub trait RequestSource {
    /// Produces the request to dispatch.
    fn resolve(&self) -> Result<&Request, ResolveError>;
}

impl RequestSource for Request {
    fn resolve(&self) -> Result<&Request, ResolveError> {
        Ok(self)
    }
}

/// Matches invocation paths of the form `<init_dir>/<service>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitScriptPattern {
    init_dir: Utf8PathBuf,
}

impl InitScriptPattern {
    /// Creates a pattern for scripts living directly in `init_dir`.
    pub fn new(init_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            init_dir: init_dir.into(),
        }
    }

    /// Creates a pattern for the configured init directory.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.init_dir().to_path_buf())
    }

    /// Extracts the service name from an invocation path.
    pub fn service_name<'a>(&self, invocation: &'a OsStr) -> Result<&'a str, ResolveError> {
        let mismatch = || ResolveError::InvocationPath {
            path: invocation.to_string_lossy().into_owned(),
            init_dir: self.init_dir.clone(),
        };
        let path = invocation.to_str().map(Utf8Path::new).ok_or_else(mismatch)?;
        match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) if parent == self.init_dir.as_path() => Ok(name),
            _ => Err(mismatch()),
        }
    }
}

/// Write-once holder for a bootstrapped request.
///
/// The first successful resolution wins; later resolutions return the same
/// instance without consulting their argument source.
#[derive(Debug, Default)]
pub struct RequestCell {
    cell: OnceCell<Request>,
}

impl RequestCell {
    /// Creates an empty cell.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// The process-wide cell used by the binary.
    #[must_use]
    pub fn process() -> &'static Self {
        &PROCESS_REQUEST
    }

    /// Returns the cached request, if one has been bootstrapped.
    #[must_use]
    pub fn get(&self) -> Option<&Request> {
        self.cell.get()
    }

    /// Returns the cached request, deriving it from `args` on first use.
    ///
    /// `args` is the full argument vector including the invocation path. It
    /// is only evaluated when the cell is empty.
    pub fn get_or_bootstrap<F, I>(
        &self,
        pattern: &InitScriptPattern,
        args: F,
    ) -> Result<&Request, ResolveError>
    where
        F: FnOnce() -> I,
        I: IntoIterator<Item = OsString>,
    {
        self.cell.get_or_try_init(|| bootstrap(pattern, args()))
    }
}

fn bootstrap<I>(pattern: &InitScriptPattern, args: I) -> Result<Request, ResolveError>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    let invocation = args.next().ok_or(ResolveError::MissingInvocation)?;
    let name = pattern.service_name(&invocation)?;

    // Tokens are taken verbatim: `--`, flag-like and non-UTF-8 tokens are
    // judged by the dispatcher, not rejected here.
    let mut tokens = args.map(|token| token.to_string_lossy().into_owned());
    let mut builder = Request::builder(name);
    if let Some(command) = tokens.next() {
        builder = builder.command(command);
    }
    let request = builder.args(tokens).build()?;
    debug!(
        target: RESOLVE_TARGET,
        service = request.name(),
        command = request.command().unwrap_or_default(),
        extra_arguments = request.args().len(),
        "resolved init-script request"
    );
    Ok(request)
}

/// Derives the request from an init-script invocation.
#[derive(Debug)]
pub struct ProcessRequest<'a> {
    cell: &'a RequestCell,
    pattern: InitScriptPattern,
    args: Vec<OsString>,
}

impl<'a> ProcessRequest<'a> {
    /// Creates a source backed by `cell`.
    ///
    /// `args` starts with the invocation path; configuration flags must
    /// already have been removed.
    #[must_use]
    pub fn new(cell: &'a RequestCell, pattern: InitScriptPattern, args: Vec<OsString>) -> Self {
        Self {
            cell,
            pattern,
            args,
        }
    }
}

impl ProcessRequest<'static> {
    /// Creates a source backed by the process-wide cell.
    #[must_use]
    pub fn for_process(pattern: InitScriptPattern, args: Vec<OsString>) -> Self {
        Self::new(RequestCell::process(), pattern, args)
    }
}

impl RequestSource for ProcessRequest<'_> {
    fn resolve(&self) -> Result<&Request, ResolveError> {
        self.cell
            .get_or_bootstrap(&self.pattern, || self.args.iter().cloned())
    }
}
