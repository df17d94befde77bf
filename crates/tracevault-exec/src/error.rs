use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while scheduling or dispatching tool calls.
#[derive(Debug)]
pub enum Error {
    /// Trace store / context operation failed mid-execution.
    Context(tracevault_context::Error),
    /// The executor was cancelled while a layer was in flight.
    Cancelled,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Context(err) => write!(f, "trace context error: {}", err),
            Error::Cancelled => write!(f, "parallel execution cancelled"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Context(err) => Some(err),
            Error::Cancelled => None,
        }
    }
}

impl From<tracevault_context::Error> for Error {
    fn from(err: tracevault_context::Error) -> Self {
        Error::Context(err)
    }
}
