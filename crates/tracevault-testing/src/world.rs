//! `VirtualClock` and `TestWorld`: a ready-made, isolated workspace for
//! exercising `TraceStore`/`TraceContext` without touching the wall clock
//! or a shared filesystem location.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;
use tracevault_context::{TraceContext, TraceStore};
use tracevault_core::Clock;
use tracevault_types::TraceId;

/// A `Clock` the test drives by hand, so duration-sensitive assertions
/// (span `duration_ms`, ordering) don't depend on real elapsed time.
pub struct VirtualClock {
    current: Mutex<DateTime<Utc>>,
}

impl VirtualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Starts at a fixed, arbitrary instant rather than `Utc::now()`, so two
    /// runs of the same test produce identical timestamps.
    pub fn epoch() -> Self {
        Self::new(DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap().into())
    }

    pub fn advance(&self, delta: Duration) {
        let mut current = self.current.lock().unwrap();
        *current += delta;
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.current.lock().unwrap() = instant;
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap()
    }
}

/// An isolated, disposable `TraceStore` rooted in a temp directory, paired
/// with the `VirtualClock` driving it.
///
/// ```no_run
/// use tracevault_testing::TestWorld;
///
/// let world = TestWorld::new();
/// let mut ctx = world.trace_context(None);
/// let span = ctx.start_span(
///     tracevault_types::SpanKind::AgentTurn, "turn-1", "manager", None, None,
/// ).unwrap();
/// ctx.end_span(tracevault_types::SpanStatus::Ok, None, None, None).unwrap();
/// ```
pub struct TestWorld {
    _temp_dir: TempDir,
    store: Arc<TraceStore>,
    clock: Arc<VirtualClock>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let clock = Arc::new(VirtualClock::epoch());
        let store = TraceStore::open(temp_dir.path())
            .expect("failed to open TraceStore in temp dir")
            .with_clock(Arc::clone(&clock) as tracevault_core::SharedClock);
        Self {
            _temp_dir: temp_dir,
            store: Arc::new(store),
            clock,
        }
    }

    pub fn store(&self) -> Arc<TraceStore> {
        Arc::clone(&self.store)
    }

    pub fn clock(&self) -> Arc<VirtualClock> {
        Arc::clone(&self.clock)
    }

    pub fn root(&self) -> &std::path::Path {
        self._temp_dir.path()
    }

    /// A fresh `TraceContext` bound to this world's store, for a new or
    /// explicit trace id.
    pub fn trace_context(&self, trace_id: Option<TraceId>) -> TraceContext {
        TraceContext::new(Arc::clone(&self.store), trace_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_clock_only_advances_when_told() {
        let clock = VirtualClock::epoch();
        let a = clock.now();
        let b = clock.now();
        assert_eq!(a, b);
        clock.advance(Duration::seconds(5));
        assert_eq!(clock.now(), a + Duration::seconds(5));
    }

    #[test]
    fn test_world_provides_a_working_trace_context() {
        let world = TestWorld::new();
        let mut ctx = world.trace_context(None);
        let span = ctx
            .start_span(tracevault_types::SpanKind::AgentTurn, "turn-1", "manager", None, None)
            .unwrap();
        ctx.end_span(tracevault_types::SpanStatus::Ok, None, None, None)
            .unwrap();

        let spans = world.store().get_trace_spans(ctx.trace_id()).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].span_id, span);
    }
}
