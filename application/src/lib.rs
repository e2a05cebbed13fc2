//! Application layer for toolweave
//!
//! This crate contains the orchestration use case and the port definitions
//! it depends on. It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    agent_progress::{AgentProgressNotifier, NoAgentProgress},
    llm_gateway::{ChatCompletion, ChatGateway, ChatRequest, GatewayError, TokenUsage},
    tool_executor::{ExecutionCancelled, ToolExecutorPort},
};
pub use use_cases::run_agent::{
    AgentEvent, AgentStream, RunAgentError, RunAgentInput, RunAgentUseCase,
};
