//! Agent execution progress port.
//!
//! [`AgentProgressNotifier`] is an **output port** that the presentation layer
//! implements to display orchestration progress as it happens. The streaming
//! entry point is built on the same callbacks.
//!
//! # Example Implementation
//!
//! ```ignore
//! use toolweave_application::ports::agent_progress::AgentProgressNotifier;
//!
//! struct MyProgress;
//!
//! impl AgentProgressNotifier for MyProgress {
//!     fn on_tool_call_start(&self, call: &ToolCall, cached: bool) {
//!         println!("-> {} (cached: {})", call.tool_name, cached);
//!     }
//! }
//! ```

use toolweave_domain::{AgentOutcome, ToolCall, ToolResult};

/// Progress notifier for agent execution.
///
/// All methods have default no-op implementations, so implementers only
/// need to override the callbacks they care about.
pub trait AgentProgressNotifier: Send + Sync {
    /// Called before the model is invoked for an iteration (1-based)
    fn on_reasoning_start(&self, _iteration: usize) {}

    /// Called with the raw model text of an iteration
    fn on_model_reply(&self, _iteration: usize, _text: &str) {}

    /// Called for every requested call, in request order, before execution
    fn on_tool_call_start(&self, _call: &ToolCall, _cached: bool) {}

    /// Called for every requested call, in request order, once the batch is done
    fn on_tool_call_complete(&self, _call: &ToolCall, _result: &ToolResult, _cached: bool) {}

    /// Called once with the answer the request terminates with
    fn on_final_content(&self, _content: &str, _outcome: AgentOutcome) {}
}

/// No-op implementation for when progress reporting is not needed
pub struct NoAgentProgress;

impl AgentProgressNotifier for NoAgentProgress {}
