//! Logging infrastructure: JSONL transcript files.
//!
//! Diagnostic logging goes through `tracing`; this module persists the
//! conversation itself.

mod jsonl_logger;

pub use jsonl_logger::JsonlTranscriptWriter;
