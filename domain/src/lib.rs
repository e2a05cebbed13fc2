//! Domain layer for toolweave
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Tool Catalog
//!
//! A concurrent registry of invocable [`Tool`]s plus their [`ToolMetadata`]
//! (category, tags, version). Retrieval-category tools get tenant scoping.
//!
//! ## Orchestration
//!
//! A bounded loop: prompt the model, parse any requested [`ToolCall`]s,
//! execute them, fold the [`ToolResult`]s back into the transcript, repeat
//! until the model answers in plain text or [`AgentConfig::max_tool_calls`]
//! is exhausted.

pub mod agent;
pub mod core;
pub mod prompt;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use agent::{
    AgentConfig, AgentMetrics, AgentOutcome, AgentResponse, BUDGET_EXHAUSTED_MESSAGE, Citation,
    has_tool_calls, parse_tool_calls, parse_tool_calls_json,
};
pub use prompt::AgentPromptTemplate;
pub use session::{AgentMessage, MessageBody, Role};
pub use tool::{
    DefaultToolValidator, MIN_SCORE_ARG, ParamType, RegisteredTool, RetrievedDocument,
    StructuredOutput, TENANT_ARG, TOP_K_ARG, Tool, ToolCall, ToolCatalog, ToolCategory,
    ToolDefinition, ToolError, ToolMetadata, ToolOutput, ToolParameter, ToolResult,
    ToolValidator, ValidationError,
};
