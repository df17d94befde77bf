use serde::{Deserialize, Serialize};
use tracevault_types::{SpanId, SpanKind, SpanStatus};

use crate::span::Span;

/// One row of a trace's compressed chronological listing: a pointer back to
/// the full span (`trace_ref`) plus the fields a viewer needs without
/// loading it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub trace_ref: SpanId,
    pub kind: SpanKind,
    pub name: String,
    pub actor_id: String,
    pub status: SpanStatus,
    pub duration_ms: Option<i64>,
    pub tool_name: Option<String>,
}

impl From<&Span> for SummaryEntry {
    fn from(span: &Span) -> Self {
        let tool_name = span
            .tool_provenance
            .as_ref()
            .map(|tp| tp.tool_name.clone());
        SummaryEntry {
            trace_ref: span.span_id.clone(),
            kind: span.kind,
            name: span.name.clone(),
            actor_id: span.actor_id.clone(),
            status: span.status,
            duration_ms: span.duration_ms(),
            tool_name,
        }
    }
}

/// Read-only projection over a trace's reconstructed spans. Pure function of
/// the spans passed in; holds no storage of its own. Repeated reads of the
/// same path are not collapsed — every `ToolCall` span gets its own entry,
/// even if several reference the same file.
pub struct SummaryEventLog<'a> {
    spans: &'a [Span],
}

impl<'a> SummaryEventLog<'a> {
    pub fn new(spans: &'a [Span]) -> Self {
        Self { spans }
    }

    /// One entry per span, ordered as given (callers pass spans already
    /// ordered by their `SpanStart` seq).
    pub fn summary(&self) -> Vec<SummaryEntry> {
        self.spans.iter().map(SummaryEntry::from).collect()
    }

    pub fn tool_calls(&self) -> Vec<SummaryEntry> {
        self.spans
            .iter()
            .filter(|s| s.kind == SpanKind::ToolCall)
            .map(SummaryEntry::from)
            .collect()
    }

    pub fn errors(&self) -> Vec<SummaryEntry> {
        self.spans
            .iter()
            .filter(|s| s.status == SpanStatus::Error)
            .map(SummaryEntry::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tracevault_types::{Attributes, ToolProvenance, TraceId};

    fn span(kind: SpanKind, status: SpanStatus, tool_name: Option<&str>) -> Span {
        Span {
            span_id: SpanId::generate(),
            trace_id: TraceId::generate(),
            parent_span_id: None,
            kind,
            name: "span".into(),
            actor_id: "executor".into(),
            start_ts: chrono::Utc::now(),
            end_ts: Some(chrono::Utc::now()),
            status,
            attributes: Attributes::new(),
            tool_provenance: tool_name.map(|n| ToolProvenance::new(n, "hash", "v1")),
            links: HashSet::new(),
            informed_by: HashSet::new(),
            input_artifact_hashes: HashSet::new(),
            output_artifact_hashes: HashSet::new(),
            error_class: None,
            error_message: None,
        }
    }

    #[test]
    fn tool_calls_filters_by_kind() {
        let spans = vec![
            span(SpanKind::ToolCall, SpanStatus::Ok, Some("Read")),
            span(SpanKind::AgentTurn, SpanStatus::Ok, None),
        ];
        let log = SummaryEventLog::new(&spans);
        assert_eq!(log.tool_calls().len(), 1);
        assert_eq!(log.tool_calls()[0].tool_name.as_deref(), Some("Read"));
    }

    #[test]
    fn errors_filters_by_status() {
        let spans = vec![
            span(SpanKind::ToolCall, SpanStatus::Error, Some("Write")),
            span(SpanKind::ToolCall, SpanStatus::Ok, Some("Read")),
        ];
        let log = SummaryEventLog::new(&spans);
        assert_eq!(log.errors().len(), 1);
    }

    #[test]
    fn repeated_reads_of_same_path_are_not_collapsed() {
        let spans = vec![
            span(SpanKind::ToolCall, SpanStatus::Ok, Some("Read")),
            span(SpanKind::ToolCall, SpanStatus::Ok, Some("Read")),
        ];
        let log = SummaryEventLog::new(&spans);
        assert_eq!(log.tool_calls().len(), 2);
    }
}
