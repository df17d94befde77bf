use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ArtifactHash, SpanId, TraceId};
use crate::kinds::{EventType, ProvenanceRelation, SpanKind, SpanStatus};

/// A scalar attribute value. Attributes are a string-to-scalar map, never
/// nested structures — nesting belongs in artifact payloads, not span
/// metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

pub type Attributes = HashMap<String, AttributeValue>;

/// Identifies the exact tool implementation that produced a `ToolCall` span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolProvenance {
    pub tool_name: String,
    pub schema_hash: String,
    pub impl_version: String,
    #[serde(default)]
    pub external_fingerprint: HashMap<String, String>,
}

impl ToolProvenance {
    pub fn new(
        tool_name: impl Into<String>,
        schema_hash: impl Into<String>,
        impl_version: impl Into<String>,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            schema_hash: schema_hash.into(),
            impl_version: impl_version.into(),
            external_fingerprint: HashMap::new(),
        }
    }

    pub fn with_fingerprint(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.external_fingerprint.insert(key.into(), value.into());
        self
    }
}

/// Width/height pair for video artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Specialization of artifact metadata for `video` artifacts. The
/// `timebase_offset` plus a span's timestamps let a caller seek from a span
/// to the matching video frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub codec: String,
    pub container: String,
    pub duration_ms: u64,
    pub resolution: Resolution,
    pub fps: f64,
    pub timebase_offset: DateTime<Utc>,
    pub span_id: SpanId,
}

/// Discriminated payload carried by a `TraceEvent`. Tagged so unknown
/// variants on read are a recoverable `Corrupted`-class error rather than a
/// silent data loss, per the design note on dynamic-type payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "payload", rename_all = "snake_case")]
pub enum EventPayload {
    SpanStart {
        span_id: SpanId,
        parent_span_id: Option<SpanId>,
        kind: SpanKind,
        name: String,
        actor_id: String,
        #[serde(default)]
        attributes: Attributes,
        tool_provenance: Option<ToolProvenance>,
    },
    SpanEnd {
        span_id: SpanId,
        status: SpanStatus,
        error_class: Option<String>,
        error_message: Option<String>,
        output_artifact_hash: Option<ArtifactHash>,
    },
    SpanLink {
        from_span_id: SpanId,
        to_span_id: SpanId,
    },
    Provenance {
        relation: ProvenanceRelation,
        subject_span_id: SpanId,
        object_artifact_hash: Option<ArtifactHash>,
        object_span_id: Option<SpanId>,
    },
    ArtifactRef {
        span_id: Option<SpanId>,
        artifact_hash: ArtifactHash,
        artifact_type: String,
    },
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        match self {
            EventPayload::SpanStart { .. } => EventType::SpanStart,
            EventPayload::SpanEnd { .. } => EventType::SpanEnd,
            EventPayload::SpanLink { .. } => EventType::SpanLink,
            EventPayload::Provenance { .. } => EventType::Provenance,
            EventPayload::ArtifactRef { .. } => EventType::ArtifactRef,
        }
    }
}

/// Schema version embedded in every persisted event row, for forward
/// compatibility of the payload encoding.
pub const SCHEMA_VERSION: u32 = 1;

/// The only durable unit in the system. Immutable once written; spans are
/// reconstructed, never stored directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub event_id: String,
    pub trace_id: TraceId,
    /// Non-negative, strictly increasing per `trace_id`. Assigned by the
    /// event log at append time.
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub payload: EventPayload,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl TraceEvent {
    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_start_payload_round_trips() {
        let payload = EventPayload::SpanStart {
            span_id: SpanId::new("span-000000000001"),
            parent_span_id: None,
            kind: SpanKind::AgentTurn,
            name: "turn-1".into(),
            actor_id: "manager".into(),
            attributes: Attributes::new(),
            tool_provenance: None,
        };
        let json = serde_json::to_string(&payload).unwrap();
        let back: EventPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(payload, back);
        assert_eq!(back.event_type(), EventType::SpanStart);
    }
}
