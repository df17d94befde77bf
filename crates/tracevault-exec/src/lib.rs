//! Tool conflict model and parallel executor: partitions a batch of tool
//! invocations into conflict-free layers and dispatches them through trace
//! contexts forked per worker thread.

mod conflict;
mod error;
mod executor;
mod harness;

pub use conflict::{conflicts, ConflictClass, ToolConflictModel};
pub use error::{Error, Result};
pub use executor::{fork_trace_context, ParallelExecutor};
pub use harness::{ToolCall, ToolHarness, ToolResult};
