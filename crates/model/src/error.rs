use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The model provider is rate limited. Requests failing with this kind
    /// may succeed when retried later.
    RateLimitExceeded,
    /// The provider could not be reached.
    Network,
    /// The provider answered with something that doesn't follow its
    /// protocol.
    Protocol,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::RateLimitExceeded => write!(f, "rate limit exceeded"),
            ErrorKind::Network => write!(f, "network error"),
            ErrorKind::Protocol => write!(f, "protocol error"),
            ErrorKind::Other => write!(f, "model error"),
        }
    }
}
