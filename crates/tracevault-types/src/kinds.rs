use serde::{Deserialize, Serialize};

/// Kind of unit of work a span represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    AgentTurn,
    Reasoning,
    LlmCall,
    ToolCall,
    ContextAssembly,
    ParallelGroup,
}

/// Terminal (or in-flight) status of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanStatus {
    /// `SpanStart` has been written but no `SpanEnd` yet.
    Started,
    Ok,
    Error,
    Cancelled,
}

/// Discriminant of a `TraceEvent`'s payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    SpanStart,
    SpanEnd,
    SpanLink,
    Provenance,
    ArtifactRef,
}

/// A labeled causal edge in the PROV family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvenanceRelation {
    /// Subject span used object artifact as input.
    Used,
    /// Subject span produced object artifact.
    WasGeneratedBy,
    /// Subject span's work derived from object span's result.
    WasInformedBy,
}
