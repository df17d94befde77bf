mod event;
mod ids;
mod kinds;
mod util;

pub mod error;

pub use error::{Error, Result};
pub use event::{
    Attributes, AttributeValue, EventPayload, Resolution, ToolProvenance, TraceEvent,
    VideoMetadata, SCHEMA_VERSION,
};
pub use ids::{ArtifactHash, SpanId, TraceId};
pub use kinds::{EventType, ProvenanceRelation, SpanKind, SpanStatus};
pub use util::*;
