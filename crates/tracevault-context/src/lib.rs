//! The agent-facing facade: binds the event log (`tracevault-index`) and
//! artifact store into `TraceStore`, and wraps that in `TraceContext` for
//! per-worker span-stack bookkeeping that forks safely under parallelism.

mod artifact_store;
mod config;
mod error;
mod trace_context;
mod trace_store;

pub use artifact_store::{Artifact, ArtifactStore, VideoMetadata};
pub use config::{resolve_root, Settings};
pub use error::{Error, Result};
pub use trace_context::TraceContext;
pub use trace_store::TraceStore;
