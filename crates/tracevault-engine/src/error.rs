use std::fmt;

/// Result type for tracevault-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reconstructing spans from the event log.
#[derive(Debug)]
pub enum Error {
    /// A `SpanEnd` (or other auxiliary event) was found with no matching
    /// `SpanStart`.
    Corrupted(String),
    /// `reconstruct_span` was asked for a span with zero events.
    NotFound(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Corrupted(msg) => write!(f, "corrupted trace data: {}", msg),
            Error::NotFound(what) => write!(f, "not found: {}", what),
        }
    }
}

impl std::error::Error for Error {}
