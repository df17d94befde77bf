use std::fmt;

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for SDK operations.
#[derive(Debug)]
pub enum Error {
    /// Error from the underlying trace store / context layer.
    Store(tracevault_context::Error),
    /// Error from the parallel executor.
    Exec(tracevault_exec::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Store(err) => write!(f, "{}", err),
            Error::Exec(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Store(err) => Some(err),
            Error::Exec(err) => Some(err),
        }
    }
}

impl From<tracevault_context::Error> for Error {
    fn from(err: tracevault_context::Error) -> Self {
        Error::Store(err)
    }
}

impl From<tracevault_exec::Error> for Error {
    fn from(err: tracevault_exec::Error) -> Self {
        Error::Exec(err)
    }
}
