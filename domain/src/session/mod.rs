//! Conversation domain module
//!
//! [`AgentMessage`] turns are append-only; the orchestration loop folds tool
//! calls and results into the transcript in the order the model requested
//! them.

pub mod entities;

pub use entities::{AgentMessage, MessageBody, Role};
