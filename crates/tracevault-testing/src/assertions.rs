//! Custom assertions for trace/span validation in integration tests.

use tracevault_engine::Span;
use tracevault_types::{SpanId, SpanStatus};

/// Asserts the trace contains exactly `expected` spans, returning them for
/// further inspection on success.
pub fn assert_span_count(spans: &[Span], expected: usize) -> Result<(), String> {
    if spans.len() != expected {
        return Err(format!("expected {} spans, got {}", expected, spans.len()));
    }
    Ok(())
}

/// Asserts every span in the trace has ended (`end_ts` set) — i.e. no span
/// was left dangling by a missing `end_span` call.
pub fn assert_all_spans_closed(spans: &[Span]) -> Result<(), String> {
    for span in spans {
        if span.end_ts.is_none() {
            return Err(format!("span {} was never closed", span.span_id));
        }
    }
    Ok(())
}

/// Asserts no span in the trace recorded an error status.
pub fn assert_no_errors(spans: &[Span]) -> Result<(), String> {
    let failing: Vec<&SpanId> = spans
        .iter()
        .filter(|s| s.status == SpanStatus::Error)
        .map(|s| &s.span_id)
        .collect();
    if !failing.is_empty() {
        return Err(format!("spans recorded errors: {:?}", failing));
    }
    Ok(())
}

/// Asserts every span in `children` names `parent` as its `parent_span_id`.
pub fn assert_all_children_of(spans: &[Span], parent: &SpanId, children: &[SpanId]) -> Result<(), String> {
    for child_id in children {
        let child = spans
            .iter()
            .find(|s| &s.span_id == child_id)
            .ok_or_else(|| format!("span {} not found in trace", child_id))?;
        if child.parent_span_id.as_ref() != Some(parent) {
            return Err(format!(
                "span {} has parent {:?}, expected {}",
                child_id, child.parent_span_id, parent
            ));
        }
    }
    Ok(())
}
