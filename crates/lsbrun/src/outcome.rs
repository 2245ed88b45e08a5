//! Dispatch results and LSB exit statuses.

use std::io::{self, Write};
use std::process::ExitCode;

/// LSB init-script exit statuses produced by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LsbStatus {
    /// The action completed.
    Success = 0,
    /// Missing, unknown, or excess arguments.
    InvalidArgument = 2,
    /// The caller lacks the privilege the action requires.
    InsufficientPrivilege = 4,
}

impl LsbStatus {
    /// Numeric exit status.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl From<LsbStatus> for ExitCode {
    fn from(status: LsbStatus) -> Self {
        Self::from(status.code())
    }
}

/// Text destined for stdout and stderr plus the exit status.
///
/// The dispatcher never writes to the process streams or exits; the runtime
/// consumes the outcome exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    stdout: String,
    stderr: String,
    status: LsbStatus,
}

impl Outcome {
    pub(crate) const fn success() -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            status: LsbStatus::Success,
        }
    }

    pub(crate) fn failure(status: LsbStatus, message: String) -> Self {
        Self {
            stdout: String::new(),
            stderr: message,
            status,
        }
    }

    pub(crate) fn push_stdout(&mut self, text: &str) {
        self.stdout.push_str(text);
    }

    pub(crate) fn with_stdout(mut self, text: &str) -> Self {
        self.push_stdout(text);
        self
    }

    /// Text written to stdout.
    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Text written to stderr.
    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Exit status.
    #[must_use]
    pub const fn status(&self) -> LsbStatus {
        self.status
    }

    /// Writes both streams and flushes them.
    pub fn write_to<W, E>(&self, stdout: &mut W, stderr: &mut E) -> io::Result<()>
    where
        W: Write,
        E: Write,
    {
        stdout.write_all(self.stdout.as_bytes())?;
        stdout.flush()?;
        stderr.write_all(self.stderr.as_bytes())?;
        stderr.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(LsbStatus::Success, 0)]
    #[case(LsbStatus::InvalidArgument, 2)]
    #[case(LsbStatus::InsufficientPrivilege, 4)]
    fn exit_codes_follow_lsb(#[case] status: LsbStatus, #[case] code: u8) {
        assert_eq!(status.code(), code);
        assert_eq!(ExitCode::from(status), ExitCode::from(code));
    }

    #[test]
    fn writes_streams_separately() {
        let outcome = Outcome::failure(LsbStatus::InvalidArgument, String::from("bad\n"))
            .with_stdout("partial");
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        outcome.write_to(&mut stdout, &mut stderr).expect("write");
        assert_eq!(stdout, b"partial");
        assert_eq!(stderr, b"bad\n");
    }
}
