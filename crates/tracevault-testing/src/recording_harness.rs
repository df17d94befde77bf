//! `RecordingHarness`: a `ToolHarness` fixture that records every call it
//! receives, so executor tests can assert on dispatch order and arguments
//! without a real tool implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use tracevault_exec::{ToolCall, ToolHarness, ToolResult};

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Records every call passed to `execute` and replies with either a
/// per-call-id override (set via `fail_call`/`succeed_call`) or the default
/// canned success result (`"ok: <tool name>"`). Safe to share across worker
/// threads as `ParallelExecutor` requires.
#[derive(Default)]
pub struct RecordingHarness {
    calls: Mutex<Vec<RecordedCall>>,
    overrides: Mutex<HashMap<String, ToolResult>>,
}

impl RecordingHarness {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls received so far, in the order `execute` was invoked —
    /// not necessarily input order, since workers race within a layer.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Makes the call with this id return a failure the next time (and
    /// every time thereafter, until overridden again) it is executed.
    pub fn fail_call(&self, id: impl Into<String>, error: impl Into<String>) {
        let id = id.into();
        self.overrides
            .lock()
            .unwrap()
            .insert(id.clone(), ToolResult::error(id, error));
    }

    /// Makes the call with this id return a specific success output.
    pub fn succeed_call(&self, id: impl Into<String>, output: impl Into<String>) {
        let id = id.into();
        self.overrides
            .lock()
            .unwrap()
            .insert(id.clone(), ToolResult::ok(id, output));
    }
}

impl ToolHarness for RecordingHarness {
    fn execute(&self, call: &ToolCall) -> ToolResult {
        self.calls.lock().unwrap().push(RecordedCall {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments: call.arguments.clone(),
        });
        if let Some(result) = self.overrides.lock().unwrap().get(&call.id) {
            return result.clone();
        }
        ToolResult::ok(call.id.clone(), format!("ok: {}", call.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_every_call_and_echoes_success() {
        let harness = RecordingHarness::new();
        let call = ToolCall {
            id: "1".into(),
            name: "Read".into(),
            arguments: json!({ "file_path": "/a" }),
            schema_hash: "test-schema".into(),
            impl_version: "test-v1".into(),
        };
        let result = harness.execute(&call);
        assert!(result.success);
        assert_eq!(harness.call_count(), 1);
        assert_eq!(harness.calls()[0].name, "Read");
    }

    #[test]
    fn overridden_call_fails_as_configured() {
        let harness = RecordingHarness::new();
        harness.fail_call("1", "boom");
        let call = ToolCall {
            id: "1".into(),
            name: "Bash".into(),
            arguments: json!({ "command": "exit 1" }),
            schema_hash: "test-schema".into(),
            impl_version: "test-v1".into(),
        };
        let result = harness.execute(&call);
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("boom"));
    }
}
