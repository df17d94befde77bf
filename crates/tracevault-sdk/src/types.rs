//! Type re-exports for the SDK.
//!
//! This module re-exports the types SDK consumers work with, so internal
//! crate refactoring doesn't ripple into every call site.

// ============================================================================
// Identifiers and wire model (from tracevault-types)
// ============================================================================

pub use tracevault_types::{
    ArtifactHash, Attributes, EventPayload, EventType, ProvenanceRelation, SpanId, SpanKind,
    SpanStatus, ToolProvenance, TraceEvent, TraceId, VideoMetadata,
};

// ============================================================================
// Span reconstruction and summaries (from tracevault-engine)
// ============================================================================

pub use tracevault_engine::{Span, SummaryEntry};

// ============================================================================
// Storage facade (from tracevault-context)
// ============================================================================

pub use tracevault_context::{Artifact, Settings};

// ============================================================================
// Parallel execution (from tracevault-exec)
// ============================================================================

pub use tracevault_exec::{ConflictClass, ToolCall, ToolHarness, ToolResult};
