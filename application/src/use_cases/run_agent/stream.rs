//! Streaming surface of the RunAgent use case.
//!
//! The loop runs on a spawned task with a channel-backed progress notifier,
//! so the event order is exactly the callback order of the non-streaming
//! path.

use super::types::RunAgentError;
use crate::ports::agent_progress::AgentProgressNotifier;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use toolweave_domain::{AgentOutcome, AgentResponse, ToolCall, ToolResult};

/// Observable step of the orchestration state machine
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    ReasoningStarted {
        iteration: usize,
    },
    ToolCallStarted {
        call: ToolCall,
        cached: bool,
    },
    ToolCallCompleted {
        call: ToolCall,
        result: ToolResult,
        cached: bool,
    },
    FinalContent {
        content: String,
        outcome: AgentOutcome,
    },
}

/// Progress notifier that forwards every callback as an [`AgentEvent`]
pub(super) struct ChannelProgress {
    tx: mpsc::UnboundedSender<AgentEvent>,
}

impl ChannelProgress {
    pub(super) fn new(tx: mpsc::UnboundedSender<AgentEvent>) -> Self {
        Self { tx }
    }

    fn emit(&self, event: AgentEvent) {
        // Receiver dropped: the caller stopped listening, the loop carries on
        let _ = self.tx.send(event);
    }
}

impl AgentProgressNotifier for ChannelProgress {
    fn on_reasoning_start(&self, iteration: usize) {
        self.emit(AgentEvent::ReasoningStarted { iteration });
    }

    fn on_tool_call_start(&self, call: &ToolCall, cached: bool) {
        self.emit(AgentEvent::ToolCallStarted {
            call: call.clone(),
            cached,
        });
    }

    fn on_tool_call_complete(&self, call: &ToolCall, result: &ToolResult, cached: bool) {
        self.emit(AgentEvent::ToolCallCompleted {
            call: call.clone(),
            result: result.clone(),
            cached,
        });
    }

    fn on_final_content(&self, content: &str, outcome: AgentOutcome) {
        self.emit(AgentEvent::FinalContent {
            content: content.to_string(),
            outcome,
        });
    }
}

/// Handle for a streaming orchestration request.
///
/// Yields [`AgentEvent`]s in order (it implements [`Stream`]); once the
/// events are drained, [`finish`](AgentStream::finish) returns the
/// aggregate response.
pub struct AgentStream {
    events: mpsc::UnboundedReceiver<AgentEvent>,
    handle: JoinHandle<Result<AgentResponse, RunAgentError>>,
}

impl AgentStream {
    pub(super) fn new(
        events: mpsc::UnboundedReceiver<AgentEvent>,
        handle: JoinHandle<Result<AgentResponse, RunAgentError>>,
    ) -> Self {
        Self { events, handle }
    }

    /// Receive the next event; `None` once the loop has finished
    pub async fn next_event(&mut self) -> Option<AgentEvent> {
        self.events.recv().await
    }

    /// Wait for the loop to finish and return the aggregate response.
    ///
    /// Events not yet consumed are discarded.
    pub async fn finish(self) -> Result<AgentResponse, RunAgentError> {
        drop(self.events);
        match self.handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(RunAgentError::Cancelled),
            Err(e) => Err(RunAgentError::TaskFailed(e.to_string())),
        }
    }

    /// Stop the loop without waiting for it
    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl Stream for AgentStream {
    type Item = AgentEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_recv(cx)
    }
}
