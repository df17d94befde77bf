//! Testing infrastructure for tracevault integration tests.
//!
//! This crate provides utilities for writing robust integration tests:
//! - `TestWorld` / `VirtualClock`: an isolated workspace with a clock tests
//!   can drive by hand
//! - `assertions`: span/trace validation helpers
//! - `fixtures`: sample tool-call batches and artifact payloads
//! - `RecordingHarness`: a `ToolHarness` fixture that records every call it
//!   receives, for asserting on executor dispatch order and arguments

pub mod assertions;
pub mod fixtures;
mod recording_harness;
pub mod world;

pub use recording_harness::{RecordedCall, RecordingHarness};
pub use world::{TestWorld, VirtualClock};
