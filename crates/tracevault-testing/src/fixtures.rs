//! Sample data generation for executor and trace tests.

use serde_json::json;
use tracevault_exec::ToolCall;

/// A batch of `Read` calls against distinct paths — all mutually
/// `ParallelSafe`, useful for exercising a single-layer dispatch.
pub fn parallel_read_batch(paths: &[&str]) -> Vec<ToolCall> {
    paths
        .iter()
        .enumerate()
        .map(|(i, path)| ToolCall {
            id: format!("read-{i}"),
            name: "Read".to_string(),
            arguments: json!({ "file_path": path }),
            schema_hash: "fixture-schema".to_string(),
            impl_version: "fixture-v1".to_string(),
        })
        .collect()
}

/// Two `Write` calls targeting the same path — must land in separate
/// conflict layers.
pub fn conflicting_write_pair(path: &str) -> Vec<ToolCall> {
    vec![
        ToolCall {
            id: "write-1".to_string(),
            name: "Write".to_string(),
            arguments: json!({ "file_path": path, "content": "first" }),
            schema_hash: "fixture-schema".to_string(),
            impl_version: "fixture-v1".to_string(),
        },
        ToolCall {
            id: "write-2".to_string(),
            name: "Write".to_string(),
            arguments: json!({ "file_path": path, "content": "second" }),
            schema_hash: "fixture-schema".to_string(),
            impl_version: "fixture-v1".to_string(),
        },
    ]
}

/// A `Bash` call, always `ExclusiveGlobal`.
pub fn bash_call(id: &str, command: &str) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: "Bash".to_string(),
        arguments: json!({ "command": command }),
        schema_hash: "fixture-schema".to_string(),
        impl_version: "fixture-v1".to_string(),
    }
}

/// Deterministic byte payload for artifact-store fixtures, sized and
/// seeded by `label` so repeated calls with the same label dedupe the way
/// two identical real artifacts would.
pub fn sample_artifact_bytes(label: &str) -> Vec<u8> {
    label.repeat(64).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_read_batch_has_one_call_per_path() {
        let batch = parallel_read_batch(&["/a", "/b", "/c"]);
        assert_eq!(batch.len(), 3);
        assert!(batch.iter().all(|c| c.name == "Read"));
    }

    #[test]
    fn sample_artifact_bytes_is_deterministic() {
        assert_eq!(sample_artifact_bytes("x"), sample_artifact_bytes("x"));
        assert_ne!(sample_artifact_bytes("x"), sample_artifact_bytes("y"));
    }
}
