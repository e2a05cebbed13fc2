//! Per-request agent configuration.
//!
//! [`AgentConfig`] is a static value object: the orchestration loop reads it
//! but never mutates it during a request.

use serde::{Deserialize, Serialize};

/// Immutable configuration for one orchestration request.
///
/// # Example
///
/// ```
/// use toolweave_domain::AgentConfig;
///
/// let config = AgentConfig::default()
///     .with_max_tool_calls(3)
///     .with_parallel_tools(false);
///
/// assert_eq!(config.max_tool_calls, 3);
/// assert!(!config.parallel_tools);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum reasoning iterations that may request tool calls
    pub max_tool_calls: usize,
    /// Run independent calls of one iteration concurrently
    pub parallel_tools: bool,
    /// Use retrieval-augmented context (tenant-scoped document search)
    pub use_rag: bool,
    /// Number of documents retrieval calls should ask for
    pub rag_top_k: usize,
    /// Minimum relevance score for retrieved documents
    pub rag_min_score: f64,
    /// Ask the model to reason step by step before answering
    pub chain_of_thought: bool,
    /// Replaces the default behavior rules of the system prompt
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_calls: 5,
            parallel_tools: true,
            use_rag: true,
            rag_top_k: 5,
            rag_min_score: 0.5,
            chain_of_thought: true,
            system_prompt: None,
        }
    }
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_tool_calls(mut self, max: usize) -> Self {
        self.max_tool_calls = max;
        self
    }

    pub fn with_parallel_tools(mut self, parallel: bool) -> Self {
        self.parallel_tools = parallel;
        self
    }

    pub fn with_rag(mut self, use_rag: bool) -> Self {
        self.use_rag = use_rag;
        self
    }

    pub fn with_rag_top_k(mut self, top_k: usize) -> Self {
        self.rag_top_k = top_k;
        self
    }

    pub fn with_rag_min_score(mut self, min_score: f64) -> Self {
        self.rag_min_score = min_score;
        self
    }

    pub fn with_chain_of_thought(mut self, enabled: bool) -> Self {
        self.chain_of_thought = enabled;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.max_tool_calls, 5);
        assert!(config.parallel_tools);
        assert!(config.use_rag);
        assert_eq!(config.rag_top_k, 5);
        assert!(config.system_prompt.is_none());
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let config: AgentConfig = serde_json::from_str(r#"{"max_tool_calls": 2}"#).unwrap();
        assert_eq!(config.max_tool_calls, 2);
        assert!(config.parallel_tools);
        assert_eq!(config.rag_min_score, 0.5);
    }
}
