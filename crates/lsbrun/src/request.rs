//! The unit of work handed to the dispatcher.
//!
//! A [`Request`] names the service, the raw command token, and any residual
//! tokens. The command is kept verbatim so that unrecognised keywords can be
//! reported back exactly as the operator typed them.

use thiserror::Error;

/// Service name, command token, and residual arguments for one dispatch.
///
/// Requests are immutable once built; construct them with
/// [`Request::builder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    name: String,
    command: Option<String>,
    args: Vec<String>,
}

impl Request {
    /// Starts building a request for the named service.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lsbrun::Request;
    ///
    /// let request = Request::builder("web").command("start").build()?;
    /// assert_eq!(request.name(), "web");
    /// assert_eq!(request.command(), Some("start"));
    /// assert!(request.args().is_empty());
    /// # Ok::<(), lsbrun::RequestError>(())
    /// ```
    pub fn builder(name: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            name: name.into(),
            command: None,
            args: Vec::new(),
        }
    }

    /// Target service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Command token, if one was supplied.
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    /// Tokens following the command.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Builder returned by [`Request::builder`].
#[derive(Debug, Clone)]
#[must_use]
pub struct RequestBuilder {
    name: String,
    command: Option<String>,
    args: Vec<String>,
}

impl RequestBuilder {
    /// Sets the command token.
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Sets the residual tokens following the command.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Validates the service name and produces the request.
    pub fn build(self) -> Result<Request, RequestError> {
        if self.name.trim().is_empty() {
            return Err(RequestError::MissingName);
        }
        if self
            .name
            .chars()
            .any(|character| character == '/' || character.is_whitespace())
        {
            return Err(RequestError::InvalidName { name: self.name });
        }
        Ok(Request {
            name: self.name,
            command: self.command,
            args: self.args,
        })
    }
}

/// Validation failures raised while building a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The service name was empty.
    #[error("a service name must be provided")]
    MissingName,
    /// The service name was not a single identifier.
    #[error("service name '{name}' must not contain path separators or whitespace")]
    InvalidName {
        /// The rejected name.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn args_default_to_empty() {
        let request = Request::builder("web").build().expect("valid request");
        assert_eq!(request.command(), None);
        assert!(request.args().is_empty());
    }

    #[test]
    fn keeps_unrecognised_commands_verbatim() {
        let request = Request::builder("web")
            .command("bounce")
            .args(["--now"])
            .build()
            .expect("valid request");
        assert_eq!(request.command(), Some("bounce"));
        assert_eq!(request.args(), ["--now"]);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn rejects_missing_names(#[case] name: &str) {
        let error = Request::builder(name).build().unwrap_err();
        assert_eq!(error, RequestError::MissingName);
    }

    #[rstest]
    #[case("init.d/web")]
    #[case("web server")]
    fn rejects_non_scalar_names(#[case] name: &str) {
        let error = Request::builder(name).build().unwrap_err();
        assert!(matches!(error, RequestError::InvalidName { .. }));
    }
}
