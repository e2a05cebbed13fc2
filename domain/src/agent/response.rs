//! Terminal output of an orchestration request.

use crate::session::entities::AgentMessage;
use crate::tool::entities::ToolCall;
use crate::tool::value_objects::RetrievedDocument;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Answer returned when the iteration cap is hit without a final answer
pub const BUDGET_EXHAUSTED_MESSAGE: &str = "I'm sorry, but I couldn't complete your request within the allowed number of tool calls. Please try rephrasing or narrowing your question.";

/// Rough characters-per-token ratio used for cost estimation
const CHARS_PER_TOKEN: usize = 4;
/// USD per 1K estimated tokens
const COST_PER_1K_TOKENS: f64 = 0.002;
/// Flat USD fee per executed tool call
const COST_PER_TOOL_CALL: f64 = 0.0001;

/// How the orchestration loop terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentOutcome {
    /// The model produced a plain answer
    Finalized,
    /// The iteration cap was reached first
    BudgetExhausted,
}

impl AgentOutcome {
    pub fn as_str(&self) -> &str {
        match self {
            AgentOutcome::Finalized => "finalized",
            AgentOutcome::BudgetExhausted => "budget_exhausted",
        }
    }
}

impl std::fmt::Display for AgentOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A structured reference extracted from retrieval output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub document_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl From<&RetrievedDocument> for Citation {
    fn from(doc: &RetrievedDocument) -> Self {
        Self {
            document_id: doc.document_id.clone(),
            page: doc.page,
            score: doc.score,
            text: doc.text.clone(),
        }
    }
}

/// Metrics accumulated over one request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentMetrics {
    /// Number of tool calls actually executed (cache hits excluded)
    pub tool_calls: usize,
    /// Number of documents cited by retrieval calls
    pub documents_retrieved: usize,
    /// Wall-clock duration of the request
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    /// Rough USD estimate; not billing grade
    pub estimated_cost: f64,
    /// Executed calls per tool name
    pub tool_usage: BTreeMap<String, usize>,
}

impl AgentMetrics {
    /// Estimate cost from transcript length and executed call count.
    pub fn estimate_cost(transcript_chars: usize, executed_calls: usize) -> f64 {
        let tokens = transcript_chars.div_ceil(CHARS_PER_TOKEN);
        tokens as f64 / 1000.0 * COST_PER_1K_TOKENS + executed_calls as f64 * COST_PER_TOOL_CALL
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// Aggregated response of the orchestration loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Final answer text (or the budget apology)
    pub answer: String,
    pub outcome: AgentOutcome,
    /// Number of reasoning iterations performed
    pub iterations: usize,
    /// Full ordered transcript, history included
    pub messages: Vec<AgentMessage>,
    /// Tool calls actually executed, deduplicated, in execution order
    pub tool_calls: Vec<ToolCall>,
    /// Content of every executed retrieval call
    pub retrieved_documents: Vec<String>,
    pub citations: Vec<Citation>,
    pub metrics: AgentMetrics,
}

impl AgentResponse {
    pub fn is_finalized(&self) -> bool {
        self.outcome == AgentOutcome::Finalized
    }
}
