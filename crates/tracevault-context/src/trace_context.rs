use std::sync::Arc;

use tracevault_types::{
    ArtifactHash, Attributes, ProvenanceRelation, SpanId, SpanKind, SpanStatus, ToolProvenance,
    TraceId,
};

use crate::artifact_store::Artifact;
use crate::trace_store::TraceStore;
use crate::{Error, Result};

/// Per-worker handle carrying the current-span stack. The single most
/// important concurrency rule in the system: a `TraceContext` is exclusive
/// to one worker and must never be shared across threads. Parallelism comes
/// from `fork`, not from sharing.
pub struct TraceContext {
    store: Arc<TraceStore>,
    trace_id: TraceId,
    stack: Vec<SpanId>,
}

impl TraceContext {
    pub fn new(store: Arc<TraceStore>, trace_id: Option<TraceId>) -> Self {
        Self {
            store,
            trace_id: trace_id.unwrap_or_else(TraceId::generate),
            stack: Vec::new(),
        }
    }

    pub fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    /// Top of the stack without mutating it.
    pub fn current_span_id(&self) -> Option<&SpanId> {
        self.stack.last()
    }

    pub fn start_span(
        &mut self,
        kind: SpanKind,
        name: &str,
        actor_id: &str,
        attributes: Option<Attributes>,
        tool_provenance: Option<ToolProvenance>,
    ) -> Result<SpanId> {
        let parent_span_id = self.current_span_id().cloned();
        let span_id = self.store.start_span(
            &self.trace_id,
            kind,
            name,
            actor_id,
            parent_span_id,
            attributes,
            tool_provenance,
        )?;
        self.stack.push(span_id.clone());
        Ok(span_id)
    }

    pub fn end_span(
        &mut self,
        status: SpanStatus,
        error_class: Option<String>,
        error_message: Option<String>,
        output_artifact_hash: Option<ArtifactHash>,
    ) -> Result<()> {
        let span_id = self.stack.pop().ok_or(Error::StackEmpty)?;
        self.store.end_span(
            &self.trace_id,
            &span_id,
            status,
            error_class,
            error_message,
            output_artifact_hash,
        )
    }

    /// Forwarded to `TraceStore`; when the subject is omitted, it defaults
    /// to the current top of stack.
    pub fn add_provenance(
        &self,
        relation: ProvenanceRelation,
        subject_span_id: Option<&SpanId>,
        object_artifact_hash: Option<ArtifactHash>,
        object_span_id: Option<SpanId>,
    ) -> Result<()> {
        let subject = subject_span_id
            .or_else(|| self.current_span_id())
            .ok_or(Error::StackEmpty)?;
        self.store.add_provenance(
            &self.trace_id,
            relation,
            subject,
            object_artifact_hash,
            object_span_id,
        )
    }

    /// Stores the bytes, then appends an `ArtifactRef` for the current span
    /// (if any) — the distinction from `TraceStore::store_artifact`'s bare
    /// store, which never appends a reference.
    pub fn store_artifact(
        &self,
        bytes: &[u8],
        artifact_type: &str,
        content_type: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<Artifact> {
        let artifact = self
            .store
            .store_artifact(bytes, artifact_type, content_type, metadata)?;
        self.store.link_artifact(
            &self.trace_id,
            self.current_span_id(),
            &artifact.artifact_hash,
            artifact_type,
        )?;
        Ok(artifact)
    }

    /// Produces a new context sharing this one's `TraceStore` and
    /// `trace_id`, with an empty, independent span stack. Spans opened on
    /// the fork without further nesting parent to `parent_span_id`
    /// (defaulting to this context's current span at fork time).
    pub fn fork(&self, parent_span_id: Option<SpanId>) -> TraceContext {
        let root = parent_span_id.or_else(|| self.current_span_id().cloned());
        TraceContext {
            store: Arc::clone(&self.store),
            trace_id: self.trace_id.clone(),
            stack: root.into_iter().collect(),
        }
    }

    /// Runs `f` with a span open for its duration, closing it `Ok` on
    /// success or `Error` (with `error_message` set from `Display`) if `f`
    /// returns an `Err`. Guarantees the span closes on every exit path.
    pub fn with_span<T, E>(
        &mut self,
        kind: SpanKind,
        name: &str,
        actor_id: &str,
        f: impl FnOnce(&mut Self) -> std::result::Result<T, E>,
    ) -> Result<T>
    where
        E: std::fmt::Display,
    {
        self.start_span(kind, name, actor_id, None, None)?;
        match f(self) {
            Ok(value) => {
                self.end_span(SpanStatus::Ok, None, None, None)?;
                Ok(value)
            }
            Err(e) => {
                let message = e.to_string();
                self.end_span(SpanStatus::Error, None, Some(message.clone()), None)?;
                Err(Error::Config(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TraceStore;

    fn context() -> TraceContext {
        let store = Arc::new(TraceStore::open_in_memory().unwrap());
        TraceContext::new(store, None)
    }

    #[test]
    fn nested_spans_parent_automatically() {
        let mut ctx = context();
        let parent = ctx
            .start_span(SpanKind::AgentTurn, "turn-1", "manager", None, None)
            .unwrap();
        let child = ctx
            .start_span(SpanKind::ToolCall, "fs.read", "executor", None, None)
            .unwrap();

        let reconstructed = ctx.store.reconstruct_span(&ctx.trace_id, &child).unwrap();
        assert_eq!(reconstructed.parent_span_id, Some(parent));
    }

    #[test]
    fn end_span_on_empty_stack_is_an_error() {
        let mut ctx = context();
        let err = ctx
            .end_span(SpanStatus::Ok, None, None, None)
            .unwrap_err();
        assert!(matches!(err, Error::StackEmpty));
    }

    #[test]
    fn fork_has_independent_stack() {
        let mut ctx = context();
        let parent = ctx
            .start_span(SpanKind::AgentTurn, "turn-1", "manager", None, None)
            .unwrap();

        let mut forked = ctx.fork(None);
        assert_eq!(forked.current_span_id(), Some(&parent));

        forked
            .start_span(SpanKind::ToolCall, "fs.write", "executor", None, None)
            .unwrap();

        // Pushing onto the fork must not affect the parent's stack.
        assert_eq!(ctx.current_span_id(), Some(&parent));
    }

    #[test]
    fn with_span_closes_on_error_path() {
        let mut ctx = context();
        let result: Result<()> = ctx.with_span(SpanKind::ToolCall, "fs.read", "executor", |_| {
            Err::<(), _>("boom")
        });
        assert!(result.is_err());
        assert!(ctx.current_span_id().is_none());
    }
}
