//! Arquivo Worker Library
//!
//! The background extraction queue: an in-memory, single-consumer job list
//! that runs the advanced extraction pass and writes results back to the
//! document store. Job records are process-local and lost on restart.

pub mod context;
pub mod queue;

pub use context::DocumentTextSink;
pub use queue::{ExtractionQueue, ExtractionQueueConfig};
