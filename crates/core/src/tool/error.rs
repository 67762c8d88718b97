use std::borrow::Cow;
use std::fmt::{self, Display};

use serde_json::{Value, json};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The model asked for a tool that is not registered.
    UnknownTool,
    /// The arguments provided to the tool were invalid.
    InvalidArguments,
    /// Error occurred while executing the tool.
    ExecutionError,
}

impl ErrorKind {
    /// Returns the identifier used in error payloads sent to the model.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnknownTool => "unknown_tool",
            ErrorKind::InvalidArguments => "invalid_arguments",
            ErrorKind::ExecutionError => "execution_error",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::UnknownTool => write!(f, "Unknown tool"),
            ErrorKind::InvalidArguments => write!(f, "Invalid arguments"),
            ErrorKind::ExecutionError => write!(f, "Execution error"),
        }
    }
}

/// Describes a tool call error.
///
/// Errors never abort a turn. They are reported back to the model as a
/// JSON payload (see [`Error::to_payload`]) in place of the tool result.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Error {
    kind: ErrorKind,
    reason: Option<String>,
}

impl Error {
    /// Creates a new error with the `UnknownTool` kind.
    #[inline]
    pub fn unknown_tool(name: &str) -> Self {
        Self {
            kind: ErrorKind::UnknownTool,
            reason: Some(format!("no tool named `{name}`")),
        }
    }

    /// Creates a new error with the `InvalidArguments` kind.
    #[inline]
    pub fn invalid_arguments() -> Self {
        Self {
            kind: ErrorKind::InvalidArguments,
            reason: None,
        }
    }

    /// Creates a new error with the `ExecutionError` kind.
    #[inline]
    pub fn execution_error() -> Self {
        Self {
            kind: ErrorKind::ExecutionError,
            reason: None,
        }
    }

    /// Attaches a reason to the error.
    #[inline]
    pub fn with_reason<S: Into<String>>(self, reason: S) -> Self {
        Self {
            kind: self.kind,
            reason: Some(reason.into()),
        }
    }

    /// Returns the kind of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the reason for the error.
    #[inline]
    pub fn reason(&self) -> Cow<'_, str> {
        match self.reason.as_deref() {
            Some(reason) => Cow::Borrowed(reason),
            None => Cow::Owned(format!("{}", self.kind)),
        }
    }

    /// Returns the payload reported to the model.
    pub fn to_payload(&self) -> Value {
        json!({
            "error": self.kind.as_str(),
            "message": self.reason(),
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{}: {reason}", self.kind),
            None => Display::fmt(&self.kind, f),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload() {
        let err = Error::unknown_tool("order_pizza");
        assert_eq!(
            err.to_payload(),
            json!({
                "error": "unknown_tool",
                "message": "no tool named `order_pizza`",
            })
        );

        let err = Error::execution_error();
        assert_eq!(
            err.to_payload(),
            json!({ "error": "execution_error", "message": "Execution error" })
        );
    }
}
