//! Prompt domain
//!
//! Templates for the system prompt and transcript rendering used by each
//! iteration of the orchestration loop.

pub mod agent;

pub use agent::AgentPromptTemplate;
