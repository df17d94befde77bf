use std::fmt;

/// Result type for tracevault-index operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the event log layer.
#[derive(Debug)]
pub enum Error {
    /// Database operation failed.
    Database(rusqlite::Error),
    /// IO operation failed.
    Io(std::io::Error),
    /// Query-specific error (invalid input, not found, etc.)
    Query(String),
    /// The engine reported contention beyond the internal retry ceiling.
    StorageBusy,
    /// Requested `(trace_id, span_id)` or event has no matching rows.
    NotFound(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Database(err) => write!(f, "database error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Query(msg) => write!(f, "query error: {}", msg),
            Error::StorageBusy => write!(f, "event log busy: retry ceiling exceeded"),
            Error::NotFound(what) => write!(f, "not found: {}", what),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Database(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Query(_) | Error::StorageBusy | Error::NotFound(_) => None,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
