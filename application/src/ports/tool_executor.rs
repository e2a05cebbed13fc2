//! Tool Executor port
//!
//! Defines the interface for validating and executing tool calls against a
//! [`ToolCatalog`]. Execution faults never escape as errors: they become
//! failed [`ToolResult`]s. Only cancellation is reported out of band.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use toolweave_domain::tool::{ToolCall, ToolCatalog, ToolDefinition, ToolResult, ValidationError};

/// The cancellation token fired while calls were in flight
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("tool execution cancelled")]
pub struct ExecutionCancelled;

/// Port for tool execution
///
/// This port defines how the application layer executes tools.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Catalog the executor resolves tool names against
    fn catalog(&self) -> &ToolCatalog;

    /// Check if a tool is available
    fn has_tool(&self, name: &str) -> bool {
        self.catalog().contains(name)
    }

    /// Definitions of all available tools, sorted by name
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.catalog().definitions()
    }

    /// Validate a call against the declared schema of its tool
    fn validate(&self, call: &ToolCall) -> Result<(), ValidationError>;

    /// Validate and execute one call.
    async fn execute_one(
        &self,
        call: &ToolCall,
        token: &CancellationToken,
    ) -> Result<ToolResult, ExecutionCancelled>;

    /// Execute calls concurrently; results are returned in input order.
    ///
    /// One failing call does not affect the others.
    async fn execute_all(
        &self,
        calls: &[ToolCall],
        token: &CancellationToken,
    ) -> Result<Vec<ToolResult>, ExecutionCancelled>;

    /// Execute calls one after another, in input order.
    async fn execute_sequential(
        &self,
        calls: &[ToolCall],
        token: &CancellationToken,
    ) -> Result<Vec<ToolResult>, ExecutionCancelled> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            if token.is_cancelled() {
                return Err(ExecutionCancelled);
            }
            results.push(self.execute_one(call, token).await?);
        }
        Ok(results)
    }

    /// Execute calls concurrently and key the results by tool name.
    ///
    /// When the same tool appears more than once, the later result wins.
    async fn execute_batch(
        &self,
        calls: &[ToolCall],
        token: &CancellationToken,
    ) -> Result<HashMap<String, ToolResult>, ExecutionCancelled> {
        let results = self.execute_all(calls, token).await?;
        Ok(calls
            .iter()
            .map(|call| call.tool_name.clone())
            .zip(results)
            .collect())
    }
}
