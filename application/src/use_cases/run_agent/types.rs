//! Type definitions for the RunAgent use case.

use crate::ports::llm_gateway::GatewayError;
use crate::ports::tool_executor::ExecutionCancelled;
use thiserror::Error;
use toolweave_domain::{AgentConfig, AgentMessage};

/// Errors that can occur during Agent execution
///
/// Tool faults and malformed tool-call syntax never show up here; they are
/// folded into the transcript instead.
#[derive(Error, Debug)]
pub enum RunAgentError {
    #[error("Gateway error: {0}")]
    GatewayError(#[from] GatewayError),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Agent task failed: {0}")]
    TaskFailed(String),
}

impl RunAgentError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunAgentError::Cancelled)
    }
}

/// Input for one orchestration request
#[derive(Debug, Clone)]
pub struct RunAgentInput {
    pub user_message: String,
    /// Prior conversation turns, oldest first
    pub history: Vec<AgentMessage>,
    pub config: AgentConfig,
    /// Tenant scope injected into retrieval and memory calls
    pub tenant_id: Option<String>,
}

impl RunAgentInput {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            history: Vec::new(),
            config: AgentConfig::default(),
            tenant_id: None,
        }
    }

    pub fn with_history(mut self, history: Vec<AgentMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }
}

impl From<ExecutionCancelled> for RunAgentError {
    fn from(_: ExecutionCancelled) -> Self {
        RunAgentError::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_agent_error_cancelled() {
        let error = RunAgentError::Cancelled;
        assert_eq!(error.to_string(), "Operation cancelled");
        assert!(error.is_cancelled());
        assert!(RunAgentError::from(ExecutionCancelled).is_cancelled());
    }

    #[test]
    fn test_gateway_error_is_not_cancelled() {
        let error = RunAgentError::from(GatewayError::Timeout);
        assert_eq!(error.to_string(), "Gateway error: Timeout");
        assert!(!error.is_cancelled());
    }

    #[test]
    fn test_input_builders() {
        let input = RunAgentInput::new("hi")
            .with_tenant("acme")
            .with_config(AgentConfig::default().with_max_tool_calls(2))
            .with_history(vec![AgentMessage::user("earlier")]);
        assert_eq!(input.tenant_id.as_deref(), Some("acme"));
        assert_eq!(input.config.max_tool_calls, 2);
        assert_eq!(input.history.len(), 1);
    }
}
