use serde_json::Value;

/// One tool invocation in a batch handed to the executor.
///
/// `schema_hash`/`impl_version` identify the exact tool implementation
/// invoked — the caller (whoever owns the tool registry) is responsible for
/// populating them with real values; the executor only threads them into the
/// span's `ToolProvenance` verbatim.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
    pub schema_hash: String,
    pub impl_version: String,
}

/// The opaque outcome of one tool invocation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolResult {
    pub id: String,
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: true,
            output: output.into(),
            error: None,
        }
    }

    pub fn error(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: false,
            output: String::new(),
            error: Some(error.into()),
        }
    }
}

/// External tool implementation injected into `ParallelExecutor`. The core
/// does not know how tools work, only how to classify and trace them; it
/// requires this object be safe to call from multiple worker threads at
/// once.
pub trait ToolHarness: Send + Sync {
    fn execute(&self, call: &ToolCall) -> ToolResult;
}
