//! Shared utilities for use cases.
//!
//! Cancellation checking and the cancellable model call.

use crate::ports::llm_gateway::{ChatCompletion, ChatGateway, ChatRequest};
use crate::use_cases::run_agent::RunAgentError;
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
///
/// Returns `Err(RunAgentError::Cancelled)` if the token is cancelled.
pub(crate) fn check_cancelled(token: &CancellationToken) -> Result<(), RunAgentError> {
    if token.is_cancelled() {
        return Err(RunAgentError::Cancelled);
    }
    Ok(())
}

/// Invoke the model, abandoning the call as soon as the token fires.
pub(crate) async fn complete_cancellable(
    gateway: &dyn ChatGateway,
    request: &ChatRequest,
    token: &CancellationToken,
) -> Result<ChatCompletion, RunAgentError> {
    check_cancelled(token)?;

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(RunAgentError::Cancelled),
        result = gateway.complete(request) => result.map_err(RunAgentError::GatewayError),
    }
}
