//! Agent domain module
//!
//! Per-request configuration, the aggregated response of the orchestration
//! loop, and extraction of tool calls from model replies.

pub mod config;
pub mod response;
pub mod tool_call_parser;

pub use config::AgentConfig;
pub use response::{AgentMetrics, AgentOutcome, AgentResponse, BUDGET_EXHAUSTED_MESSAGE, Citation};
pub use tool_call_parser::{has_tool_calls, parse_tool_calls, parse_tool_calls_json};
