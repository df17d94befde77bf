use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracevault_core::SharedClock;
use tracevault_engine::{reconstruct_span, Span, SummaryEntry, SummaryEventLog};
use tracevault_index::Database;
use tracevault_types::{
    ArtifactHash, Attributes, EventPayload, EventType, ProvenanceRelation, SpanId, SpanKind,
    SpanStatus, ToolProvenance, TraceEvent, TraceId,
};

use crate::artifact_store::{Artifact, ArtifactStore, VideoMetadata};
use crate::{Error, Result};

/// Binds the event log and artifact store; the agent-facing facade that
/// enforces span semantics the lower layers don't know about (unknown span,
/// double close, invalid provenance combinations).
pub struct TraceStore {
    log: Arc<Database>,
    artifacts: ArtifactStore,
    clock: SharedClock,
}

impl TraceStore {
    /// Opens (creating if absent) `<root>/traces.db` for the event log and
    /// `<root>/artifacts/` for blob storage.
    pub fn open(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root)?;
        let log = Arc::new(Database::open(&root.join("traces.db"))?);
        let artifacts = ArtifactStore::open(root.join("artifacts"), Arc::clone(&log))?;
        Ok(Self {
            log,
            artifacts,
            clock: tracevault_core::system_clock(),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let log = Arc::new(Database::open_in_memory()?);
        let artifacts = ArtifactStore::open(std::env::temp_dir().join(format!(
            "tracevault-inmemory-{}",
            uuid::Uuid::new_v4()
        )), Arc::clone(&log))?;
        Ok(Self {
            log,
            artifacts,
            clock: tracevault_core::system_clock(),
        })
    }

    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    fn append(&self, trace_id: &TraceId, payload: EventPayload) -> Result<TraceEvent> {
        let event = TraceEvent {
            event_id: uuid::Uuid::new_v4().to_string(),
            trace_id: trace_id.clone(),
            seq: 0,
            timestamp: self.clock.now(),
            schema_version: tracevault_types::SCHEMA_VERSION,
            payload,
        };
        let seq = self.log.append(&event)?;
        Ok(TraceEvent { seq, ..event })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn start_span(
        &self,
        trace_id: &TraceId,
        kind: SpanKind,
        name: &str,
        actor_id: &str,
        parent_span_id: Option<SpanId>,
        attributes: Option<Attributes>,
        tool_provenance: Option<ToolProvenance>,
    ) -> Result<SpanId> {
        let span_id = SpanId::generate();
        self.append(
            trace_id,
            EventPayload::SpanStart {
                span_id: span_id.clone(),
                parent_span_id,
                kind,
                name: name.to_string(),
                actor_id: actor_id.to_string(),
                attributes: attributes.unwrap_or_default(),
                tool_provenance,
            },
        )?;
        Ok(span_id)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn end_span(
        &self,
        trace_id: &TraceId,
        span_id: &SpanId,
        status: SpanStatus,
        error_class: Option<String>,
        error_message: Option<String>,
        output_artifact_hash: Option<ArtifactHash>,
    ) -> Result<()> {
        let events = self.log.events_for_span(trace_id, span_id.as_str())?;
        let started = events
            .iter()
            .any(|e| matches!(&e.payload, EventPayload::SpanStart { .. }));
        if !started {
            return Err(Error::UnknownSpan(span_id.to_string()));
        }
        let already_closed = events
            .iter()
            .any(|e| matches!(&e.payload, EventPayload::SpanEnd { .. }));
        if already_closed {
            return Err(Error::DoubleClose(span_id.to_string()));
        }

        self.append(
            trace_id,
            EventPayload::SpanEnd {
                span_id: span_id.clone(),
                status,
                error_class,
                error_message,
                output_artifact_hash,
            },
        )?;
        Ok(())
    }

    pub fn add_span_link(
        &self,
        trace_id: &TraceId,
        span_id: &SpanId,
        linked_span_id: &SpanId,
    ) -> Result<()> {
        self.append(
            trace_id,
            EventPayload::SpanLink {
                from_span_id: span_id.clone(),
                to_span_id: linked_span_id.clone(),
            },
        )?;
        Ok(())
    }

    /// Permitted combinations: `Used(span, artifact)`, `WasGeneratedBy(span,
    /// artifact)`, `WasInformedBy(span, span)`. Anything else is
    /// `InvalidRelation`.
    pub fn add_provenance(
        &self,
        trace_id: &TraceId,
        relation: ProvenanceRelation,
        subject_span_id: &SpanId,
        object_artifact_hash: Option<ArtifactHash>,
        object_span_id: Option<SpanId>,
    ) -> Result<()> {
        let valid = match relation {
            ProvenanceRelation::Used | ProvenanceRelation::WasGeneratedBy => {
                object_artifact_hash.is_some() && object_span_id.is_none()
            }
            ProvenanceRelation::WasInformedBy => {
                object_span_id.is_some() && object_artifact_hash.is_none()
            }
        };
        if !valid {
            return Err(Error::InvalidRelation(format!(
                "{:?} requires exactly one matching object",
                relation
            )));
        }

        self.append(
            trace_id,
            EventPayload::Provenance {
                relation,
                subject_span_id: subject_span_id.clone(),
                object_artifact_hash,
                object_span_id,
            },
        )?;
        Ok(())
    }

    pub fn reconstruct_span(&self, trace_id: &TraceId, span_id: &SpanId) -> Result<Span> {
        let events = self.log.events_for_span(trace_id, span_id.as_str())?;
        if events.is_empty() {
            return Err(Error::UnknownSpan(span_id.to_string()));
        }
        Ok(reconstruct_span(&events)?)
    }

    pub fn get_trace_spans(&self, trace_id: &TraceId) -> Result<Vec<Span>> {
        let span_ids = self.log.span_ids_in_order(trace_id)?;
        span_ids
            .into_iter()
            .map(|span_id| self.reconstruct_span(trace_id, &SpanId::new(span_id)))
            .collect()
    }

    pub fn summary(&self, trace_id: &TraceId) -> Result<Vec<SummaryEntry>> {
        let spans = self.get_trace_spans(trace_id)?;
        Ok(SummaryEventLog::new(&spans).summary())
    }

    pub fn tool_calls(&self, trace_id: &TraceId) -> Result<Vec<SummaryEntry>> {
        let spans = self.get_trace_spans(trace_id)?;
        Ok(SummaryEventLog::new(&spans).tool_calls())
    }

    pub fn errors(&self, trace_id: &TraceId) -> Result<Vec<SummaryEntry>> {
        let spans = self.get_trace_spans(trace_id)?;
        Ok(SummaryEventLog::new(&spans).errors())
    }

    /// Bare store: writes the artifact but does not append an `ArtifactRef`
    /// event. `TraceContext` wraps this to add the reference once a span is
    /// in scope.
    pub fn store_artifact(
        &self,
        bytes: &[u8],
        artifact_type: &str,
        content_type: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<Artifact> {
        self.artifacts.store(bytes, artifact_type, content_type, metadata)
    }

    pub fn store_video(
        &self,
        path: &Path,
        content_type: &str,
        video_metadata: VideoMetadata,
    ) -> Result<Artifact> {
        self.artifacts.store_video(path, content_type, video_metadata)
    }

    pub fn get_artifact(&self, hash: &ArtifactHash) -> Result<Vec<u8>> {
        self.artifacts.retrieve(hash)
    }

    pub fn artifact_descriptor(&self, hash: &ArtifactHash) -> Result<Artifact> {
        self.artifacts.get_descriptor(hash)
    }

    pub fn artifact_exists(&self, hash: &ArtifactHash) -> bool {
        self.artifacts.exists(hash)
    }

    /// Appends an `ArtifactRef` event tying `span_id` to an already-stored
    /// artifact. Used by `TraceContext::store_artifact` once a current span
    /// exists.
    pub fn link_artifact(
        &self,
        trace_id: &TraceId,
        span_id: Option<&SpanId>,
        artifact_hash: &ArtifactHash,
        artifact_type: &str,
    ) -> Result<()> {
        self.append(
            trace_id,
            EventPayload::ArtifactRef {
                span_id: span_id.cloned(),
                artifact_hash: artifact_hash.clone(),
                artifact_type: artifact_type.to_string(),
            },
        )?;
        Ok(())
    }

    pub fn query(
        &self,
        trace_id: &TraceId,
        since_seq: Option<u64>,
        event_type: Option<EventType>,
    ) -> Result<Vec<TraceEvent>> {
        Ok(self.log.query(trace_id, since_seq, event_type)?)
    }

    pub fn now(&self) -> chrono::DateTime<Utc> {
        self.clock.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_and_end_span_round_trip() {
        let store = TraceStore::open_in_memory().unwrap();
        let trace_id = TraceId::generate();

        let span_id = store
            .start_span(&trace_id, SpanKind::AgentTurn, "turn-1", "manager", None, None, None)
            .unwrap();
        store
            .end_span(&trace_id, &span_id, SpanStatus::Ok, None, None, None)
            .unwrap();

        let span = store.reconstruct_span(&trace_id, &span_id).unwrap();
        assert_eq!(span.status, SpanStatus::Ok);
    }

    #[test]
    fn ending_unknown_span_is_an_error() {
        let store = TraceStore::open_in_memory().unwrap();
        let trace_id = TraceId::generate();
        let span_id = SpanId::generate();

        let err = store
            .end_span(&trace_id, &span_id, SpanStatus::Ok, None, None, None)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownSpan(_)));
    }

    #[test]
    fn ending_already_closed_span_is_double_close() {
        let store = TraceStore::open_in_memory().unwrap();
        let trace_id = TraceId::generate();
        let span_id = store
            .start_span(&trace_id, SpanKind::ToolCall, "fs.read", "executor", None, None, None)
            .unwrap();
        store
            .end_span(&trace_id, &span_id, SpanStatus::Ok, None, None, None)
            .unwrap();

        let err = store
            .end_span(&trace_id, &span_id, SpanStatus::Ok, None, None, None)
            .unwrap_err();
        assert!(matches!(err, Error::DoubleClose(_)));
    }

    #[test]
    fn invalid_provenance_combination_is_rejected() {
        let store = TraceStore::open_in_memory().unwrap();
        let trace_id = TraceId::generate();
        let span_id = store
            .start_span(&trace_id, SpanKind::ToolCall, "fs.read", "executor", None, None, None)
            .unwrap();

        let err = store
            .add_provenance(&trace_id, ProvenanceRelation::Used, &span_id, None, None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRelation(_)));
    }

    #[test]
    fn get_trace_spans_orders_by_span_start_seq() {
        let store = TraceStore::open_in_memory().unwrap();
        let trace_id = TraceId::generate();
        let first = store
            .start_span(&trace_id, SpanKind::AgentTurn, "turn-1", "manager", None, None, None)
            .unwrap();
        let second = store
            .start_span(
                &trace_id,
                SpanKind::ToolCall,
                "fs.read",
                "executor",
                Some(first.clone()),
                None,
                None,
            )
            .unwrap();

        let spans = store.get_trace_spans(&trace_id).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].span_id, first);
        assert_eq!(spans[1].span_id, second);
        assert_eq!(spans[1].parent_span_id, Some(first));
    }
}
