use std::path::PathBuf;
use std::sync::Arc;

use tracevault_context::{resolve_root, TraceContext, TraceStore};
use tracevault_engine::{Span, SummaryEntry};
use tracevault_types::TraceId;

use crate::error::{Error, Result};

/// Entry point for the SDK: owns the `TraceStore` and hands out
/// `TraceContext`s bound to it.
pub struct Client {
    store: Arc<TraceStore>,
}

impl Client {
    /// Opens (creating if absent) the trace store rooted at `path`.
    pub fn connect(path: impl Into<PathBuf>) -> Result<Self> {
        let store = TraceStore::open(&path.into()).map_err(Error::Store)?;
        Ok(Self {
            store: Arc::new(store),
        })
    }

    /// Opens the trace store at the default workspace root (explicit path
    /// argument > `TRACEVAULT_PATH` env var > XDG data dir > `~/.tracevault`).
    pub fn connect_default() -> Result<Self> {
        let root = resolve_root(None).map_err(Error::Store)?;
        Self::connect(root)
    }

    /// A context rooted at a new or explicit trace id, ready for spans.
    pub fn trace_context(&self, trace_id: Option<TraceId>) -> TraceContext {
        TraceContext::new(Arc::clone(&self.store), trace_id)
    }

    /// A handle to one trace's reconstructed spans and summaries.
    pub fn trace(&self, trace_id: TraceId) -> TraceHandle {
        TraceHandle {
            store: Arc::clone(&self.store),
            trace_id,
        }
    }
}

/// Read-only view over one trace's spans, independent of any open context.
pub struct TraceHandle {
    store: Arc<TraceStore>,
    trace_id: TraceId,
}

impl TraceHandle {
    pub fn spans(&self) -> Result<Vec<Span>> {
        self.store.get_trace_spans(&self.trace_id).map_err(Error::Store)
    }

    pub fn summary(&self) -> Result<Vec<SummaryEntry>> {
        self.store.summary(&self.trace_id).map_err(Error::Store)
    }

    pub fn tool_calls(&self) -> Result<Vec<SummaryEntry>> {
        self.store.tool_calls(&self.trace_id).map_err(Error::Store)
    }

    pub fn errors(&self) -> Result<Vec<SummaryEntry>> {
        self.store.errors(&self.trace_id).map_err(Error::Store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_opens_a_fresh_store_and_round_trips_a_trace() {
        let dir = tempfile::tempdir().unwrap();
        let client = Client::connect(dir.path()).unwrap();

        let mut ctx = client.trace_context(None);
        let trace_id = ctx.trace_id().clone();
        ctx.start_span(
            tracevault_types::SpanKind::AgentTurn,
            "turn-1",
            "manager",
            None,
            None,
        )
        .unwrap();
        ctx.end_span(tracevault_types::SpanStatus::Ok, None, None, None)
            .unwrap();

        let handle = client.trace(trace_id);
        assert_eq!(handle.spans().unwrap().len(), 1);
        assert_eq!(handle.summary().unwrap().len(), 1);
        assert!(handle.errors().unwrap().is_empty());
    }
}
