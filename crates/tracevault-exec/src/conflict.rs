use crate::harness::ToolCall;

/// Classification of how a tool invocation may overlap with others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictClass {
    /// Read-only over disjoint or idempotent state; never conflicts.
    ParallelSafe,
    /// May run in parallel with anything except another invocation sharing
    /// `key` (e.g. a normalized file path for a write).
    ExclusivePerKey(String),
    /// Serialized with every other invocation of its class (e.g. a stateful
    /// shell session).
    ExclusiveGlobal,
}

/// Classifies tool calls by name and arguments. Unknown tool names are
/// classified `ExclusiveGlobal` — conservative by default, since nothing is
/// known about their side effects.
#[derive(Debug, Default, Clone, Copy)]
pub struct ToolConflictModel;

impl ToolConflictModel {
    pub fn new() -> Self {
        Self
    }

    pub fn get_conflict_class(&self, tool_name: &str) -> ConflictClass {
        match tool_name {
            "Read" | "Grep" | "Glob" => ConflictClass::ParallelSafe,
            "Write" | "Edit" => ConflictClass::ExclusivePerKey(String::new()),
            "Bash" => ConflictClass::ExclusiveGlobal,
            _ => ConflictClass::ExclusiveGlobal,
        }
    }

    /// Full classification for a call, resolving `ExclusivePerKey`'s key
    /// from the call's arguments (`file_path`, falling back to the raw
    /// argument blob when a tool has no path).
    pub fn classify(&self, call: &ToolCall) -> ConflictClass {
        match self.get_conflict_class(&call.name) {
            ConflictClass::ExclusivePerKey(_) => {
                let key = call
                    .arguments
                    .get("file_path")
                    .and_then(|v| v.as_str())
                    .map(normalize_key)
                    .unwrap_or_else(|| call.arguments.to_string());
                ConflictClass::ExclusivePerKey(key)
            }
            other => other,
        }
    }

    /// Convenience query used by tests; the scheduler itself operates on
    /// conflict classes, not this boolean.
    pub fn can_run_parallel(&self, batch: &[ToolCall]) -> bool {
        for i in 0..batch.len() {
            for j in (i + 1)..batch.len() {
                if conflicts(&self.classify(&batch[i]), &self.classify(&batch[j])) {
                    return false;
                }
            }
        }
        true
    }
}

fn normalize_key(path: &str) -> String {
    std::path::Path::new(path)
        .canonicalize()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Whether two classified calls must not run concurrently.
pub fn conflicts(a: &ConflictClass, b: &ConflictClass) -> bool {
    match (a, b) {
        (ConflictClass::ParallelSafe, _) | (_, ConflictClass::ParallelSafe) => false,
        (ConflictClass::ExclusiveGlobal, _) | (_, ConflictClass::ExclusiveGlobal) => true,
        (ConflictClass::ExclusivePerKey(k1), ConflictClass::ExclusivePerKey(k2)) => k1 == k2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(id: &str, name: &str, arguments: serde_json::Value) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
            schema_hash: "test-schema".to_string(),
            impl_version: "test-v1".to_string(),
        }
    }

    #[test]
    fn read_is_parallel_safe() {
        let model = ToolConflictModel::new();
        assert_eq!(model.get_conflict_class("Read"), ConflictClass::ParallelSafe);
    }

    #[test]
    fn write_is_exclusive_per_key() {
        let model = ToolConflictModel::new();
        assert!(matches!(
            model.get_conflict_class("Write"),
            ConflictClass::ExclusivePerKey(_)
        ));
    }

    #[test]
    fn bash_is_exclusive_global() {
        let model = ToolConflictModel::new();
        assert_eq!(model.get_conflict_class("Bash"), ConflictClass::ExclusiveGlobal);
    }

    #[test]
    fn two_reads_can_run_in_parallel() {
        let model = ToolConflictModel::new();
        let batch = vec![
            call("1", "Read", json!({"file_path": "/a.txt"})),
            call("2", "Read", json!({"file_path": "/b.txt"})),
        ];
        assert!(model.can_run_parallel(&batch));
    }

    #[test]
    fn read_and_write_to_different_files_can_run_in_parallel() {
        let model = ToolConflictModel::new();
        let batch = vec![
            call("1", "Read", json!({"file_path": "/a.txt"})),
            call("3", "Write", json!({"file_path": "/c.txt", "content": "x"})),
        ];
        assert!(model.can_run_parallel(&batch));
    }

    #[test]
    fn two_writes_to_same_file_cannot_run_in_parallel() {
        let model = ToolConflictModel::new();
        let batch = vec![
            call("3", "Write", json!({"file_path": "/c.txt", "content": "x"})),
            call("4", "Write", json!({"file_path": "/c.txt", "content": "y"})),
        ];
        assert!(!model.can_run_parallel(&batch));
    }

    #[test]
    fn two_bash_calls_cannot_run_in_parallel() {
        let model = ToolConflictModel::new();
        let batch = vec![
            call("5", "Bash", json!({"command": "ls"})),
            call("6", "Bash", json!({"command": "pwd"})),
        ];
        assert!(!model.can_run_parallel(&batch));
    }
}
