use std::fmt;

/// Result type for tracevault-context operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the trace store / trace context layer.
#[derive(Debug)]
pub enum Error {
    /// Event log layer error.
    Index(tracevault_index::Error),
    /// Span reconstruction error.
    Engine(tracevault_engine::Error),
    /// Path resolution / hashing error.
    Core(tracevault_core::Error),
    /// IO operation failed (artifact bytes).
    Io(std::io::Error),
    /// Configuration error.
    Config(String),
    /// `end_span`/`reconstruct_span` given a span never started in this trace.
    UnknownSpan(String),
    /// `end_span` called twice for the same span.
    DoubleClose(String),
    /// `TraceContext::end_span` called with an empty stack.
    StackEmpty,
    /// A provenance relation named a subject/object combination the model
    /// does not permit.
    InvalidRelation(String),
    /// Unknown `artifact_hash`.
    NotFound(String),
    /// Recomputed hash did not match the stored/requested hash.
    Corrupted(String),
    /// Event log reported contention beyond its internal retry ceiling.
    StorageBusy,
    /// ParallelExecutor cancellation propagated up through the context.
    Cancelled,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Index(err) => write!(f, "event log error: {}", err),
            Error::Engine(err) => write!(f, "span reconstruction error: {}", err),
            Error::Core(err) => write!(f, "core error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "configuration error: {}", msg),
            Error::UnknownSpan(msg) => write!(f, "unknown span: {}", msg),
            Error::DoubleClose(msg) => write!(f, "span already closed: {}", msg),
            Error::StackEmpty => write!(f, "end_span called with an empty span stack"),
            Error::InvalidRelation(msg) => write!(f, "invalid provenance relation: {}", msg),
            Error::NotFound(what) => write!(f, "not found: {}", what),
            Error::Corrupted(msg) => write!(f, "corrupted: {}", msg),
            Error::StorageBusy => write!(f, "event log busy: retry ceiling exceeded"),
            Error::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Index(err) => Some(err),
            Error::Engine(err) => Some(err),
            Error::Core(err) => Some(err),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<tracevault_index::Error> for Error {
    fn from(err: tracevault_index::Error) -> Self {
        match err {
            tracevault_index::Error::StorageBusy => Error::StorageBusy,
            tracevault_index::Error::NotFound(what) => Error::NotFound(what),
            other => Error::Index(other),
        }
    }
}

impl From<tracevault_engine::Error> for Error {
    fn from(err: tracevault_engine::Error) -> Self {
        match err {
            tracevault_engine::Error::Corrupted(msg) => Error::Corrupted(msg),
            tracevault_engine::Error::NotFound(msg) => Error::NotFound(msg),
        }
    }
}

impl From<tracevault_core::Error> for Error {
    fn from(err: tracevault_core::Error) -> Self {
        Error::Core(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
