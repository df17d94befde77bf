//! Append-only SQLite-backed event log.
//!
//! `events` is the single source of truth: every span, link, and provenance
//! assertion is a row here, ordered by a per-trace monotonic `seq`. Spans
//! themselves are never stored directly — they're folded from this log.

mod db;
mod error;
mod schema;

pub use db::{ArtifactRecord, Database};
pub use error::{Error, Result};
pub use schema::SCHEMA_VERSION;
