//! Run Agent use case
//!
//! Bounded reasoning loop tying the chat model to the tool catalog:
//!
//! ```text
//! Reasoning ──▶ no tool calls ──▶ Finalized
//!     │
//!     └──▶ ToolCallRequested ──▶ dedup ──▶ execute ──▶ fold results ──▶ Reasoning
//!
//! (max_tool_calls iterations without a final answer ──▶ BudgetExhausted)
//! ```
//!
//! Each iteration's effects (cache, executed calls, citations, transcript)
//! are committed only after its batch has completed, so a cancellation
//! mid-batch leaves no partial iteration behind.

mod stream;
mod types;

pub use crate::ports::agent_progress::{AgentProgressNotifier, NoAgentProgress};
pub use stream::{AgentEvent, AgentStream};
pub use types::{RunAgentError, RunAgentInput};

use crate::ports::llm_gateway::{ChatGateway, ChatRequest};
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::shared::{check_cancelled, complete_cancellable};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use stream::ChannelProgress;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use toolweave_domain::core::string::{single_line, truncate};
use toolweave_domain::{
    AgentConfig, AgentMessage, AgentMetrics, AgentOutcome, AgentPromptTemplate, AgentResponse,
    BUDGET_EXHAUSTED_MESSAGE, Citation, MIN_SCORE_ARG, TENANT_ARG, TOP_K_ARG, ToolCall,
    ToolResult, parse_tool_calls,
};
use tracing::{debug, info, warn};

/// Use case for running the tool-calling agent
pub struct RunAgentUseCase<G: ChatGateway + 'static, T: ToolExecutorPort + 'static> {
    gateway: Arc<G>,
    tool_executor: Arc<T>,
    cancellation_token: Option<CancellationToken>,
}

impl<G, T> Clone for RunAgentUseCase<G, T>
where
    G: ChatGateway + 'static,
    T: ToolExecutorPort + 'static,
{
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            tool_executor: self.tool_executor.clone(),
            cancellation_token: self.cancellation_token.clone(),
        }
    }
}

/// Request-scoped accumulator
#[derive(Default)]
struct RunState {
    messages: Vec<AgentMessage>,
    /// cache key -> result, for deduplication across the whole request
    cache: HashMap<String, ToolResult>,
    executed: Vec<ToolCall>,
    retrieved_documents: Vec<String>,
    citations: Vec<Citation>,
    tool_usage: BTreeMap<String, usize>,
    iterations: usize,
}

impl RunState {
    fn into_response(
        self,
        answer: String,
        outcome: AgentOutcome,
        started: Instant,
    ) -> AgentResponse {
        let transcript_chars = self.messages.iter().map(AgentMessage::char_len).sum();
        let metrics = AgentMetrics {
            tool_calls: self.executed.len(),
            documents_retrieved: self.citations.len(),
            duration: started.elapsed(),
            estimated_cost: AgentMetrics::estimate_cost(transcript_chars, self.executed.len()),
            tool_usage: self.tool_usage,
        };

        AgentResponse {
            answer,
            outcome,
            iterations: self.iterations,
            messages: self.messages,
            tool_calls: self.executed,
            retrieved_documents: self.retrieved_documents,
            citations: self.citations,
            metrics,
        }
    }
}

impl<G: ChatGateway + 'static, T: ToolExecutorPort + 'static> RunAgentUseCase<G, T> {
    pub fn new(gateway: Arc<G>, tool_executor: Arc<T>) -> Self {
        Self {
            gateway,
            tool_executor,
            cancellation_token: None,
        }
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Run one request to completion
    pub async fn process(&self, input: RunAgentInput) -> Result<AgentResponse, RunAgentError> {
        self.process_with_progress(input, &NoAgentProgress).await
    }

    /// Run one request on a background task, surfacing progress as events
    pub fn process_stream(&self, input: RunAgentInput) -> AgentStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let this = self.clone();
        let handle = tokio::spawn(async move {
            let progress = ChannelProgress::new(tx);
            this.process_with_progress(input, &progress).await
        });
        AgentStream::new(rx, handle)
    }

    /// Run one request, reporting each step to `progress`
    pub async fn process_with_progress(
        &self,
        input: RunAgentInput,
        progress: &dyn AgentProgressNotifier,
    ) -> Result<AgentResponse, RunAgentError> {
        let token = self.cancellation_token.clone().unwrap_or_default();
        let started = Instant::now();
        let RunAgentInput {
            user_message,
            history,
            config,
            tenant_id,
        } = input;

        info!(
            gateway = self.gateway.name(),
            max_tool_calls = config.max_tool_calls,
            tenant = tenant_id.as_deref().unwrap_or("-"),
            "Processing request: {}",
            truncate(&single_line(&user_message), 80)
        );

        let mut messages = history;
        messages.push(AgentMessage::user(user_message));
        let mut state = RunState {
            messages,
            ..Default::default()
        };

        for iteration in 1..=config.max_tool_calls {
            check_cancelled(&token)?;
            state.iterations = iteration;
            progress.on_reasoning_start(iteration);

            let definitions = self.tool_executor.definitions();
            let request = ChatRequest::new(
                AgentPromptTemplate::system(&definitions, &config, tenant_id.as_deref()),
                AgentPromptTemplate::render_context(&state.messages),
            );
            let completion = complete_cancellable(self.gateway.as_ref(), &request, &token).await?;
            progress.on_model_reply(iteration, &completion.text);
            if let Some(usage) = completion.usage {
                debug!(
                    iteration,
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "Model usage"
                );
            }

            let mut calls = parse_tool_calls(&completion.text);
            if calls.is_empty() {
                info!(
                    iterations = iteration,
                    tool_calls = state.executed.len(),
                    "Final answer produced"
                );
                progress.on_final_content(&completion.text, AgentOutcome::Finalized);
                state
                    .messages
                    .push(AgentMessage::assistant(completion.text.clone()));
                return Ok(state.into_response(completion.text, AgentOutcome::Finalized, started));
            }

            debug!(iteration, requested = calls.len(), "Model requested tool calls");

            self.scope_calls(&mut calls, tenant_id.as_deref(), &config);

            self.execute_iteration(&mut state, calls, &config, &token, progress)
                .await?;
        }

        warn!(
            max_tool_calls = config.max_tool_calls,
            tool_calls = state.executed.len(),
            "Tool call budget exhausted without a final answer"
        );
        progress.on_final_content(BUDGET_EXHAUSTED_MESSAGE, AgentOutcome::BudgetExhausted);
        state
            .messages
            .push(AgentMessage::assistant(BUDGET_EXHAUSTED_MESSAGE));
        Ok(state.into_response(
            BUDGET_EXHAUSTED_MESSAGE.to_string(),
            AgentOutcome::BudgetExhausted,
            started,
        ))
    }

    /// Fill in request-level arguments the model left out.
    ///
    /// Tenant-scoped tools (retrieval, memory) get the tenant. With RAG
    /// enabled, retrieval tools that declare `top_k` / `min_score` get the
    /// configured limits. Runs before deduplication so cache keys include them.
    fn scope_calls(&self, calls: &mut [ToolCall], tenant: Option<&str>, config: &AgentConfig) {
        let catalog = self.tool_executor.catalog();
        for call in calls.iter_mut() {
            let Some(entry) = catalog.entry(&call.tool_name) else {
                continue;
            };

            if let Some(tenant) = tenant
                && entry.metadata.is_tenant_scoped()
                && call.inject_if_absent(TENANT_ARG, tenant)
            {
                debug!(tool = %call.tool_name, tenant, "Injected tenant scope");
            }

            if config.use_rag && entry.metadata.is_retrieval() {
                let definition = entry.definition();
                if definition.parameter(TOP_K_ARG).is_some() {
                    call.inject_if_absent(TOP_K_ARG, config.rag_top_k);
                }
                if definition.parameter(MIN_SCORE_ARG).is_some() {
                    call.inject_if_absent(MIN_SCORE_ARG, config.rag_min_score);
                }
            }
        }
    }

    /// Deduplicate, execute and fold one iteration's calls into `state`.
    async fn execute_iteration(
        &self,
        state: &mut RunState,
        calls: Vec<ToolCall>,
        config: &AgentConfig,
        token: &CancellationToken,
        progress: &dyn AgentProgressNotifier,
    ) -> Result<(), RunAgentError> {
        let keys: Vec<String> = calls.iter().map(ToolCall::cache_key).collect();

        // First occurrence of each key not already answered by the cache
        let mut cached_flags = Vec::with_capacity(calls.len());
        let mut pending: Vec<(String, ToolCall)> = Vec::new();
        {
            let mut seen: HashSet<&str> = HashSet::new();
            for (call, key) in calls.iter().zip(&keys) {
                let cached = state.cache.contains_key(key) || !seen.insert(key.as_str());
                if cached {
                    debug!(tool = %call.tool_name, "Reusing cached result");
                } else {
                    pending.push((key.clone(), call.clone()));
                }
                progress.on_tool_call_start(call, cached);
                cached_flags.push(cached);
            }
        }

        let pending_calls: Vec<ToolCall> = pending.iter().map(|(_, c)| c.clone()).collect();
        let results = if config.parallel_tools && pending_calls.len() > 1 {
            debug!(count = pending_calls.len(), "Executing tool calls in parallel");
            self.tool_executor
                .execute_all(&pending_calls, token)
                .await?
        } else {
            self.tool_executor
                .execute_sequential(&pending_calls, token)
                .await?
        };

        // Commit
        let catalog = self.tool_executor.catalog();
        for ((key, call), result) in pending.into_iter().zip(results) {
            if result.is_success() {
                debug!(
                    tool = %call.tool_name,
                    duration_ms = ?result.duration_ms,
                    "Tool call succeeded"
                );
            } else {
                warn!(
                    tool = %call.tool_name,
                    error = %result.display_content(),
                    "Tool call failed"
                );
            }

            *state.tool_usage.entry(call.tool_name.clone()).or_default() += 1;

            if catalog.is_retrieval(&call.tool_name)
                && let Some(content) = result.output()
            {
                state.retrieved_documents.push(content.to_string());
                state
                    .citations
                    .extend(result.documents().iter().map(Citation::from));
            }

            state.cache.insert(key, result);
            state.executed.push(call);
        }

        for ((call, key), cached) in calls.into_iter().zip(keys).zip(cached_flags) {
            let Some(result) = state.cache.get(&key).cloned() else {
                continue;
            };
            progress.on_tool_call_complete(&call, &result, cached);
            state.messages.push(AgentMessage::tool_call(call));
            state.messages.push(AgentMessage::tool_result(result));
        }

        Ok(())
    }
}
