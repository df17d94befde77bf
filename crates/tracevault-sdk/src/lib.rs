//! tracevault-sdk: a high-level, stable API for building observability
//! tools on top of tracevault.
//!
//! # Overview
//!
//! This crate abstracts away the internal layering of the event log,
//! span reconstruction, artifact storage, and parallel tool dispatch,
//! exposing only the primitives needed to record and analyze agent traces.
//!
//! # Quickstart
//!
//! ```no_run
//! use tracevault_sdk::{Client, types::SpanKind};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::connect_default()?;
//! let mut ctx = client.trace_context(None);
//!
//! let span = ctx.start_span(SpanKind::AgentTurn, "turn-1", "manager", None, None)?;
//! // ... do work ...
//! ctx.end_span(tracevault_sdk::types::SpanStatus::Ok, None, None, None)?;
//!
//! let handle = client.trace(ctx.trace_id().clone());
//! for entry in handle.summary()? {
//!     println!("{:?}: {}", entry.kind, entry.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! This SDK acts as a facade over:
//! - `tracevault-types`: wire model and identifiers (`TraceId`, `SpanId`, ...)
//! - `tracevault-engine`: span reconstruction and summaries
//! - `tracevault-context`: `TraceStore`/`TraceContext`/`ArtifactStore`
//! - `tracevault-exec`: `ParallelExecutor` and the tool conflict model
//!
//! # Usage Patterns
//!
//! ## Parallel Tool Dispatch
//!
//! ```no_run
//! use std::sync::Arc;
//! use tracevault_sdk::{Client, ParallelExecutor, types::{ToolCall, ToolResult, ToolHarness}};
//!
//! struct MyHarness;
//! impl ToolHarness for MyHarness {
//!     fn execute(&self, call: &ToolCall) -> ToolResult {
//!         ToolResult::ok(call.id.clone(), "done")
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::connect_default()?;
//! let ctx = client.trace_context(None);
//! let mut executor = ParallelExecutor::new(Arc::new(MyHarness), ctx, 4);
//! let results = executor.execute_parallel(vec![], None)?;
//! # let _ = results;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod types;

// Public facade
pub use client::{Client, TraceHandle};
pub use error::{Error, Result};
pub use tracevault_context::TraceContext;
pub use tracevault_exec::ParallelExecutor;
pub use tracevault_exec::ToolConflictModel;
