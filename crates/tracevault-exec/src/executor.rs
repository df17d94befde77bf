use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracevault_context::{TraceContext, TraceStore};
use tracevault_types::{ProvenanceRelation, SpanKind, SpanStatus, SpanId, ToolProvenance};

use crate::conflict::{conflicts, ToolConflictModel};
use crate::error::{Error, Result};
use crate::harness::{ToolCall, ToolHarness, ToolResult};

/// Dispatches a batch of tool invocations with the maximum concurrency each
/// tool's semantics allow, through trace contexts forked per worker.
pub struct ParallelExecutor<H: ToolHarness> {
    harness: Arc<H>,
    trace_context: TraceContext,
    max_workers: usize,
    model: ToolConflictModel,
    cancelled: Arc<AtomicBool>,
}

impl<H: ToolHarness + 'static> ParallelExecutor<H> {
    pub fn new(harness: Arc<H>, trace_context: TraceContext, max_workers: usize) -> Self {
        Self {
            harness,
            trace_context,
            max_workers: max_workers.max(1),
            model: ToolConflictModel::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cooperative cancellation handle. Workers check this between layers
    /// (and after their own call returns) and close their span
    /// `Cancelled` rather than continuing.
    pub fn cancellation_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Classifies, layers, and dispatches `tool_calls`. Each layer is a set
    /// of calls with no conflicting pair; layers run strictly in sequence,
    /// calls within a layer run concurrently (chunked to `max_workers`).
    /// Results are returned in the input order regardless of completion
    /// order.
    pub fn execute_parallel(
        &mut self,
        tool_calls: Vec<ToolCall>,
        parent_span_id: Option<SpanId>,
    ) -> Result<Vec<ToolResult>> {
        let parent = parent_span_id.or_else(|| self.trace_context.current_span_id().cloned());
        let layers = layer_by_conflicts(&tool_calls, &self.model);

        let mut results: Vec<Option<ToolResult>> = (0..tool_calls.len()).map(|_| None).collect();

        'layers: for layer in layers {
            if self.cancelled.load(Ordering::SeqCst) {
                return Err(Error::Cancelled);
            }

            for chunk in layer.chunks(self.max_workers) {
                if self.cancelled.load(Ordering::SeqCst) {
                    break 'layers;
                }

                std::thread::scope(|scope| {
                    let mut handles = Vec::with_capacity(chunk.len());
                    for &index in chunk {
                        let call = tool_calls[index].clone();
                        let forked = self.trace_context.fork(parent.clone());
                        let harness = Arc::clone(&self.harness);
                        let cancelled = Arc::clone(&self.cancelled);
                        handles.push((
                            index,
                            scope.spawn(move || run_one(forked, harness, call, cancelled)),
                        ));
                    }
                    for (index, handle) in handles {
                        let result = handle.join().unwrap_or_else(|_| {
                            ToolResult::error(
                                tool_calls[index].id.clone(),
                                "worker thread panicked",
                            )
                        });
                        results[index] = Some(result);
                    }
                });
            }
        }

        if self.cancelled.load(Ordering::SeqCst) {
            return Err(Error::Cancelled);
        }

        Ok(results.into_iter().map(|r| r.expect("every dispatched call produces a result")).collect())
    }
}

/// Opens a `ToolCall` span, annotates it with provenance, stores the
/// arguments as an input artifact (`Used`), invokes the harness, stores the
/// output as an artifact (`WasGeneratedBy`), and closes the span.
fn run_one(
    mut ctx: TraceContext,
    harness: Arc<impl ToolHarness>,
    call: ToolCall,
    cancelled: Arc<AtomicBool>,
) -> ToolResult {
    let tool_provenance =
        ToolProvenance::new(call.name.clone(), call.schema_hash.clone(), call.impl_version.clone());
    let span_id = match ctx.start_span(
        SpanKind::ToolCall,
        &call.name,
        "executor",
        None,
        Some(tool_provenance),
    ) {
        Ok(id) => id,
        Err(e) => return ToolResult::error(call.id.clone(), e.to_string()),
    };

    if let Ok(input_artifact) = ctx.store_artifact(
        call.arguments.to_string().as_bytes(),
        "tool_input",
        "application/json",
        None,
    ) {
        let _ = ctx.add_provenance(
            ProvenanceRelation::Used,
            Some(&span_id),
            Some(input_artifact.artifact_hash),
            None,
        );
    }

    if cancelled.load(Ordering::SeqCst) {
        let _ = ctx.end_span(SpanStatus::Cancelled, None, None, None);
        return ToolResult::error(call.id.clone(), "cancelled");
    }

    let result = harness.execute(&call);

    if let Ok(output_artifact) = ctx.store_artifact(
        result.output.as_bytes(),
        "tool_output",
        "text/plain",
        None,
    ) {
        let _ = ctx.add_provenance(
            ProvenanceRelation::WasGeneratedBy,
            Some(&span_id),
            Some(output_artifact.artifact_hash),
            None,
        );
    }

    let status = if result.success {
        SpanStatus::Ok
    } else {
        SpanStatus::Error
    };
    let _ = ctx.end_span(status, None, result.error.clone(), None);

    result
}

/// Builds the conflict graph and greedily colors it into conflict-free
/// layers. Order within a layer is by position in the input batch, which
/// also determines layer assignment for a given input deterministically.
fn layer_by_conflicts(tool_calls: &[ToolCall], model: &ToolConflictModel) -> Vec<Vec<usize>> {
    let classes: Vec<_> = tool_calls.iter().map(|c| model.classify(c)).collect();
    let mut layers: Vec<Vec<usize>> = Vec::new();

    for (index, class) in classes.iter().enumerate() {
        let mut placed = false;
        for layer in layers.iter_mut() {
            let conflicts_with_layer = layer
                .iter()
                .any(|&other| conflicts(class, &classes[other]));
            if !conflicts_with_layer {
                layer.push(index);
                placed = true;
                break;
            }
        }
        if !placed {
            layers.push(vec![index]);
        }
    }

    layers
}

/// Forks a fresh `TraceContext` rooted at `parent_span_id` from an existing
/// context, without disturbing the parent's own stack. A thin convenience
/// wrapper over `TraceContext::fork` for callers that don't otherwise need
/// a `ParallelExecutor`.
pub fn fork_trace_context(ctx: &TraceContext, parent_span_id: Option<SpanId>) -> TraceContext {
    ctx.fork(parent_span_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tracevault_types::TraceId;

    struct EchoHarness;

    impl ToolHarness for EchoHarness {
        fn execute(&self, call: &ToolCall) -> ToolResult {
            ToolResult::ok(call.id.clone(), format!("ran {}", call.name))
        }
    }

    fn store() -> Arc<TraceStore> {
        Arc::new(TraceStore::open_in_memory().unwrap())
    }

    fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> ToolCall {
        ToolCall {
            id: id.into(),
            name: name.into(),
            arguments,
            schema_hash: "test-schema".into(),
            impl_version: "test-v1".into(),
        }
    }

    #[test]
    fn independent_tools_land_in_one_layer() {
        let calls = vec![
            tool_call("1", "Read", serde_json::json!({"file_path": "/a"})),
            tool_call("2", "Read", serde_json::json!({"file_path": "/b"})),
        ];
        let layers = layer_by_conflicts(&calls, &ToolConflictModel::new());
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].len(), 2);
    }

    #[test]
    fn conflicting_writes_land_in_separate_layers() {
        let calls = vec![
            tool_call("1", "Write", serde_json::json!({"file_path": "/c"})),
            tool_call("2", "Write", serde_json::json!({"file_path": "/c"})),
        ];
        let layers = layer_by_conflicts(&calls, &ToolConflictModel::new());
        assert_eq!(layers.len(), 2);
    }

    #[test]
    fn execute_parallel_runs_all_calls_and_traces_them() {
        let trace_store = store();
        let mut root = TraceContext::new(Arc::clone(&trace_store), Some(TraceId::generate()));
        let parent = root
            .start_span(SpanKind::AgentTurn, "parallel_test", "manager", None, None)
            .unwrap();

        let mut executor = ParallelExecutor::new(Arc::new(EchoHarness), root.fork(Some(parent.clone())), 4);
        let calls = vec![
            tool_call("1", "Read", serde_json::json!({"file_path": "/a"})),
            tool_call("2", "Read", serde_json::json!({"file_path": "/b"})),
        ];

        let results = executor.execute_parallel(calls, Some(parent.clone())).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.success));

        let spans = trace_store.get_trace_spans(root.trace_id()).unwrap();
        let tool_spans: Vec<_> = spans.iter().filter(|s| s.kind == SpanKind::ToolCall).collect();
        assert_eq!(tool_spans.len(), 2);
        for span in tool_spans {
            assert_eq!(span.parent_span_id, Some(parent.clone()));
        }
    }

    #[test]
    fn cancellation_before_dispatch_surfaces_cancelled_error() {
        let trace_store = store();
        let root = TraceContext::new(Arc::clone(&trace_store), Some(TraceId::generate()));
        let mut executor = ParallelExecutor::new(Arc::new(EchoHarness), root, 4);
        executor.cancel();

        let calls = vec![tool_call("1", "Read", serde_json::json!({"file_path": "/a"}))];
        let err = executor.execute_parallel(calls, None).unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
