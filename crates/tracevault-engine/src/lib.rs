//! Span reconstruction and the read-only summary projection. Sits between
//! the raw event log (`tracevault-index`) and the facade that binds it to
//! storage (`tracevault-context`).

mod error;
mod span;
mod summary;

pub use error::{Error, Result};
pub use span::{reconstruct_span, Span};
pub use summary::{SummaryEntry, SummaryEventLog};
