use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracevault_types::{
    ArtifactHash, Attributes, EventPayload, ProvenanceRelation, SpanId, SpanKind, SpanStatus,
    ToolProvenance, TraceEvent, TraceId,
};

use crate::error::{Error, Result};

/// A reconstructed, immutable view of a bounded unit of work. Never stored
/// directly — always the fold of a `SpanStart`, its auxiliary events, and an
/// optional `SpanEnd`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub span_id: SpanId,
    pub trace_id: TraceId,
    pub parent_span_id: Option<SpanId>,
    pub kind: SpanKind,
    pub name: String,
    pub actor_id: String,
    pub start_ts: chrono::DateTime<chrono::Utc>,
    pub end_ts: Option<chrono::DateTime<chrono::Utc>>,
    pub status: SpanStatus,
    pub attributes: Attributes,
    pub tool_provenance: Option<ToolProvenance>,
    /// Outgoing `SpanLink` edges — fan-in aggregation bookkeeping, not a
    /// causal claim.
    pub links: HashSet<SpanId>,
    /// Spans named as the object of a `WasInformedBy` provenance assertion
    /// made by this span — a causal-derivation claim, kept separate from
    /// `links` since the two are distinct event kinds with distinct meaning.
    pub informed_by: HashSet<SpanId>,
    pub input_artifact_hashes: HashSet<ArtifactHash>,
    pub output_artifact_hashes: HashSet<ArtifactHash>,
    pub error_class: Option<String>,
    pub error_message: Option<String>,
}

impl Span {
    /// `None` while the span is still open.
    pub fn duration_ms(&self) -> Option<i64> {
        self.end_ts
            .map(|end| end.signed_duration_since(self.start_ts).num_milliseconds())
    }
}

/// Fold a span's events (its `SpanStart`, any `SpanLink`/`Provenance`/
/// `ArtifactRef` events that name it, and an optional `SpanEnd`) into a
/// `Span`. `events` need not be in `seq` order; callers load them from the
/// event log's per-span secondary index.
///
/// An orphan `SpanEnd` (no preceding `SpanStart` among `events`) is a
/// `Corrupted` error, not a silently-ignored event.
pub fn reconstruct_span(events: &[TraceEvent]) -> Result<Span> {
    let mut started: Option<(SpanId, TraceId, Option<SpanId>, SpanKind, String, String)> = None;
    let mut start_ts = None;
    let mut attributes = Attributes::new();
    let mut tool_provenance = None;

    let mut end_ts = None;
    let mut status = SpanStatus::Started;
    let mut error_class = None;
    let mut error_message = None;

    let mut links: HashSet<SpanId> = HashSet::new();
    let mut informed_by: HashSet<SpanId> = HashSet::new();
    let mut input_artifact_hashes: HashSet<ArtifactHash> = HashSet::new();
    let mut output_artifact_hashes: HashSet<ArtifactHash> = HashSet::new();

    for event in events {
        match &event.payload {
            EventPayload::SpanStart {
                span_id,
                parent_span_id,
                kind,
                name,
                actor_id,
                attributes: attrs,
                tool_provenance: tp,
            } => {
                started = Some((
                    span_id.clone(),
                    event.trace_id.clone(),
                    parent_span_id.clone(),
                    *kind,
                    name.clone(),
                    actor_id.clone(),
                ));
                start_ts = Some(event.timestamp);
                attributes = attrs.clone();
                tool_provenance = tp.clone();
            }
            EventPayload::SpanEnd {
                span_id,
                status: st,
                error_class: ec,
                error_message: em,
                output_artifact_hash,
            } => {
                if started.is_none() {
                    return Err(Error::Corrupted(format!(
                        "SpanEnd for {} has no matching SpanStart",
                        span_id
                    )));
                }
                end_ts = Some(event.timestamp);
                status = *st;
                error_class = ec.clone();
                error_message = em.clone();
                if let Some(hash) = output_artifact_hash {
                    output_artifact_hashes.insert(hash.clone());
                }
            }
            EventPayload::SpanLink { to_span_id, .. } => {
                links.insert(to_span_id.clone());
            }
            EventPayload::Provenance {
                relation,
                object_artifact_hash,
                object_span_id,
                ..
            } => match relation {
                ProvenanceRelation::Used => {
                    if let Some(hash) = object_artifact_hash {
                        input_artifact_hashes.insert(hash.clone());
                    }
                }
                ProvenanceRelation::WasGeneratedBy => {
                    if let Some(hash) = object_artifact_hash {
                        output_artifact_hashes.insert(hash.clone());
                    }
                }
                ProvenanceRelation::WasInformedBy => {
                    if let Some(span_id) = object_span_id {
                        informed_by.insert(span_id.clone());
                    }
                }
            },
            // ArtifactRef exists for in-trace visibility only (querying "what
            // artifacts touched this span"); it carries no input/output
            // direction of its own. That's derived solely from `Provenance`
            // events, above — folding it here too would double-count a hash
            // a tool call both `Used` and referenced via `store_artifact`.
            EventPayload::ArtifactRef { .. } => {}
        }
    }

    let (span_id, trace_id, parent_span_id, kind, name, actor_id) =
        started.ok_or_else(|| Error::NotFound("no SpanStart event among span events".into()))?;
    let start_ts = start_ts.expect("start_ts set alongside started");

    Ok(Span {
        span_id,
        trace_id,
        parent_span_id,
        kind,
        name,
        actor_id,
        start_ts,
        end_ts,
        status,
        attributes,
        tool_provenance,
        links,
        informed_by,
        input_artifact_hashes,
        output_artifact_hashes,
        error_class,
        error_message,
    })
}
