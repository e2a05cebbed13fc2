//! Catalog-backed tool executor — the concrete implementation of [`ToolExecutorPort`].
//!
//! [`CatalogToolExecutor`] resolves calls against a shared [`ToolCatalog`],
//! validates them, applies declared defaults and invokes the tool. Every
//! fault (unknown tool, bad arguments, tool error, panic, timeout) becomes a
//! failed [`ToolResult`]; only cancellation is reported as an error.
//!
//! # Execution Paths
//!
//! ```text
//! execute_one()  ─ prepare ─▶ invoke_guarded()            (inline, races the token)
//! execute_all()  ─ prepare ─▶ JoinSet::spawn(invoke_guarded) per call
//!                             └─ results slotted back by input index
//! ```

use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use toolweave_application::ports::tool_executor::{ExecutionCancelled, ToolExecutorPort};
use toolweave_domain::tool::{
    DefaultToolValidator, Tool, ToolCall, ToolCatalog, ToolError, ToolResult, ToolValidator,
    ValidationError,
};
use tracing::{debug, warn};

/// Executor that runs tools registered in a [`ToolCatalog`].
///
/// The catalog is shared by `Arc`, so tools registered after construction
/// are visible to subsequent calls.
#[derive(Clone)]
pub struct CatalogToolExecutor {
    catalog: Arc<ToolCatalog>,
    validator: DefaultToolValidator,
    /// Per-call time limit (None = unlimited)
    call_timeout: Option<Duration>,
}

impl CatalogToolExecutor {
    pub fn new(catalog: Arc<ToolCatalog>) -> Self {
        Self {
            catalog,
            validator: DefaultToolValidator,
            call_timeout: None,
        }
    }

    /// Fail calls that take longer than `timeout` with a `TIMEOUT` error
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Shared handle to the underlying catalog
    pub fn catalog_handle(&self) -> Arc<ToolCatalog> {
        Arc::clone(&self.catalog)
    }

    /// Resolve, validate and fill defaults.
    ///
    /// Returns the failed result directly when the call must not be invoked.
    fn prepare(&self, call: &ToolCall) -> Result<(Arc<dyn Tool>, ToolCall), ToolResult> {
        let Some(tool) = self.catalog.get(&call.tool_name) else {
            debug!(tool = %call.tool_name, "Rejected call to unknown tool");
            return Err(ToolResult::failure(
                &call.tool_name,
                ValidationError::UnknownTool(call.tool_name.clone()).into(),
            ));
        };

        if let Err(e) = self.validator.validate(call, tool.definition()) {
            debug!(tool = %call.tool_name, error = %e, "Rejected invalid call");
            return Err(ToolResult::failure(&call.tool_name, e.into()));
        }

        let mut prepared = call.clone();
        prepared.apply_defaults(tool.definition());
        Ok((tool, prepared))
    }
}

/// Invoke a tool, converting errors, panics and timeouts into failed results.
async fn invoke_guarded(
    tool: Arc<dyn Tool>,
    call: ToolCall,
    call_timeout: Option<Duration>,
) -> ToolResult {
    let start = Instant::now();
    let invocation = AssertUnwindSafe(tool.invoke(&call)).catch_unwind();

    let outcome = match call_timeout {
        Some(limit) => match tokio::time::timeout(limit, invocation).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    tool = %call.tool_name,
                    timeout_ms = limit.as_millis() as u64,
                    "Tool call timed out"
                );
                return ToolResult::failure(&call.tool_name, ToolError::timeout(&call.tool_name))
                    .with_duration(start.elapsed().as_millis() as u64);
            }
        },
        None => invocation.await,
    };

    let result = match outcome {
        Ok(Ok(output)) => ToolResult::from_output(&call.tool_name, output),
        Ok(Err(e)) => ToolResult::failure(&call.tool_name, e),
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            warn!(tool = %call.tool_name, panic = %message, "Tool panicked");
            ToolResult::failure(
                &call.tool_name,
                ToolError::execution_failed(format!("Tool panicked: {}", message)),
            )
        }
    };

    result.with_duration(start.elapsed().as_millis() as u64)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[async_trait]
impl ToolExecutorPort for CatalogToolExecutor {
    fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    fn validate(&self, call: &ToolCall) -> Result<(), ValidationError> {
        let tool = self
            .catalog
            .get(&call.tool_name)
            .ok_or_else(|| ValidationError::UnknownTool(call.tool_name.clone()))?;
        self.validator.validate(call, tool.definition())
    }

    async fn execute_one(
        &self,
        call: &ToolCall,
        token: &CancellationToken,
    ) -> Result<ToolResult, ExecutionCancelled> {
        if token.is_cancelled() {
            return Err(ExecutionCancelled);
        }

        let (tool, prepared) = match self.prepare(call) {
            Ok(ready) => ready,
            Err(failed) => return Ok(failed),
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(ExecutionCancelled),
            result = invoke_guarded(tool, prepared, self.call_timeout) => Ok(result),
        }
    }

    async fn execute_all(
        &self,
        calls: &[ToolCall],
        token: &CancellationToken,
    ) -> Result<Vec<ToolResult>, ExecutionCancelled> {
        if token.is_cancelled() {
            return Err(ExecutionCancelled);
        }

        let mut slots: Vec<Option<ToolResult>> = vec![None; calls.len()];
        let mut join_set = JoinSet::new();

        for (index, call) in calls.iter().enumerate() {
            match self.prepare(call) {
                Ok((tool, prepared)) => {
                    let call_timeout = self.call_timeout;
                    join_set.spawn(async move {
                        (index, invoke_guarded(tool, prepared, call_timeout).await)
                    });
                }
                Err(failed) => slots[index] = Some(failed),
            }
        }

        loop {
            let joined = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    join_set.abort_all();
                    return Err(ExecutionCancelled);
                }
                joined = join_set.join_next() => joined,
            };

            let Some(joined) = joined else {
                break;
            };

            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => warn!(panic = e.is_panic(), "Tool task terminated: {}", e),
            }
        }

        Ok(slots
            .into_iter()
            .zip(calls)
            .map(|(slot, call)| {
                slot.unwrap_or_else(|| {
                    ToolResult::failure(
                        &call.tool_name,
                        ToolError::execution_failed("Tool task terminated unexpectedly"),
                    )
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use toolweave_domain::tool::{
        ParamType, ToolCategory, ToolDefinition, ToolMetadata, ToolOutput, ToolParameter,
    };

    /// Records the arguments it was invoked with, after an optional delay
    struct RecordingTool {
        definition: ToolDefinition,
        delay: Duration,
        seen: Mutex<Vec<ToolCall>>,
    }

    impl RecordingTool {
        fn new(name: &str, delay_ms: u64) -> Self {
            Self {
                definition: ToolDefinition::new(name, "Records calls")
                    .with_parameter(ToolParameter::new("query", "Query", true))
                    .with_parameter(
                        ToolParameter::new("top_k", "Count", false)
                            .with_type(ParamType::Number)
                            .with_default(5),
                    )
                    .with_parameter(
                        ToolParameter::new("mode", "Mode", false)
                            .with_allowed_values(["fast", "exact"]),
                    ),
                delay: Duration::from_millis(delay_ms),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn invocations(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Tool for RecordingTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn invoke(&self, call: &ToolCall) -> Result<ToolOutput, ToolError> {
            self.seen.lock().unwrap().push(call.clone());
            tokio::time::sleep(self.delay).await;
            Ok(ToolOutput::text(format!(
                "{}:{}",
                self.definition.name,
                call.get_string("query").unwrap_or_default()
            )))
        }
    }

    struct PanickingTool {
        definition: ToolDefinition,
    }

    #[async_trait]
    impl Tool for PanickingTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn invoke(&self, _call: &ToolCall) -> Result<ToolOutput, ToolError> {
            panic!("index out of bounds");
        }
    }

    struct FailingTool {
        definition: ToolDefinition,
    }

    #[async_trait]
    impl Tool for FailingTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn invoke(&self, _call: &ToolCall) -> Result<ToolOutput, ToolError> {
            Err(ToolError::execution_failed("upstream returned 503"))
        }
    }

    fn executor_with(tools: Vec<Arc<dyn Tool>>) -> CatalogToolExecutor {
        let catalog = Arc::new(ToolCatalog::new());
        for tool in tools {
            catalog.register(tool, None);
        }
        CatalogToolExecutor::new(catalog)
    }

    fn token() -> CancellationToken {
        CancellationToken::new()
    }

    #[tokio::test]
    async fn test_unknown_tool_is_not_found() {
        let executor = executor_with(vec![]);
        let result = executor
            .execute_one(&ToolCall::new("nope"), &token())
            .await
            .unwrap();

        assert!(!result.is_success());
        assert_eq!(result.error().unwrap().code, "NOT_FOUND");
        assert!(matches!(
            executor.validate(&ToolCall::new("nope")),
            Err(ValidationError::UnknownTool(_))
        ));
    }

    #[tokio::test]
    async fn test_validation_failure_never_invokes() {
        let tool = Arc::new(RecordingTool::new("search", 0));
        let executor = executor_with(vec![tool.clone()]);

        let missing = executor
            .execute_one(&ToolCall::new("search"), &token())
            .await
            .unwrap();
        assert_eq!(missing.error().unwrap().code, "INVALID_ARGUMENT");
        assert!(missing.error().unwrap().message.contains("query"));

        let not_allowed = ToolCall::new("search")
            .with_arg("query", "x")
            .with_arg("mode", "sloppy");
        let result = executor.execute_one(&not_allowed, &token()).await.unwrap();
        assert_eq!(result.error().unwrap().code, "INVALID_ARGUMENT");

        assert_eq!(tool.invocations(), 0);
    }

    #[tokio::test]
    async fn test_defaults_applied_before_invoke() {
        let tool = Arc::new(RecordingTool::new("search", 0));
        let executor = executor_with(vec![tool.clone()]);

        let call = ToolCall::new("search").with_arg("query", "rust");
        let result = executor.execute_one(&call, &token()).await.unwrap();

        assert!(result.is_success());
        assert!(result.duration_ms.is_some());
        let seen = tool.seen.lock().unwrap();
        assert_eq!(seen[0].get_i64("top_k"), Some(5));
    }

    #[tokio::test]
    async fn test_panic_becomes_failed_result() {
        let executor = executor_with(vec![Arc::new(PanickingTool {
            definition: ToolDefinition::new("explode", "Panics"),
        })]);

        let result = executor
            .execute_one(&ToolCall::new("explode"), &token())
            .await
            .unwrap();

        assert!(!result.is_success());
        assert_eq!(result.error().unwrap().code, "EXECUTION_FAILED");
        assert!(result.error().unwrap().message.contains("index out of bounds"));
    }

    #[tokio::test]
    async fn test_timeout_becomes_failed_result() {
        let executor = executor_with(vec![Arc::new(RecordingTool::new("slow", 500))])
            .with_call_timeout(Duration::from_millis(20));

        let call = ToolCall::new("slow").with_arg("query", "x");
        let result = executor.execute_one(&call, &token()).await.unwrap();

        assert_eq!(result.error().unwrap().code, "TIMEOUT");
    }

    #[tokio::test]
    async fn test_execute_all_preserves_input_order() {
        let executor = executor_with(vec![
            Arc::new(RecordingTool::new("slow", 80)),
            Arc::new(RecordingTool::new("fast", 0)),
        ]);
        let calls = vec![
            ToolCall::new("slow").with_arg("query", "1"),
            ToolCall::new("fast").with_arg("query", "2"),
            ToolCall::new("missing"),
        ];

        let results = executor.execute_all(&calls, &token()).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].output(), Some("slow:1"));
        assert_eq!(results[1].output(), Some("fast:2"));
        assert_eq!(results[2].error().unwrap().code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_execute_all_runs_concurrently() {
        let executor = executor_with(vec![Arc::new(RecordingTool::new("wait", 100))]);
        let calls: Vec<ToolCall> = (0..4)
            .map(|i| ToolCall::new("wait").with_arg("query", format!("{i}")))
            .collect();

        let start = Instant::now();
        let results = executor.execute_all(&calls, &token()).await.unwrap();

        assert!(results.iter().all(ToolResult::is_success));
        assert!(start.elapsed() < Duration::from_millis(350));
    }

    #[tokio::test]
    async fn test_faults_do_not_abort_batch() {
        let executor = executor_with(vec![
            Arc::new(PanickingTool {
                definition: ToolDefinition::new("explode", "Panics"),
            }),
            Arc::new(FailingTool {
                definition: ToolDefinition::new("flaky", "Fails"),
            }),
            Arc::new(RecordingTool::new("ok", 10)),
        ]);
        let calls = vec![
            ToolCall::new("explode"),
            ToolCall::new("flaky"),
            ToolCall::new("ok").with_arg("query", "fine"),
        ];

        let results = executor.execute_all(&calls, &token()).await.unwrap();

        assert!(!results[0].is_success());
        assert_eq!(results[1].error().unwrap().message, "upstream returned 503");
        assert_eq!(results[2].output(), Some("ok:fine"));
    }

    #[tokio::test]
    async fn test_execute_batch_keys_by_name_later_wins() {
        let executor = executor_with(vec![Arc::new(RecordingTool::new("search", 0))]);
        let calls = vec![
            ToolCall::new("search").with_arg("query", "first"),
            ToolCall::new("search").with_arg("query", "second"),
        ];

        let results: HashMap<String, ToolResult> =
            executor.execute_batch(&calls, &token()).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results["search"].output(), Some("search:second"));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_batch() {
        let tool = Arc::new(RecordingTool::new("slow", 5_000));
        let executor = executor_with(vec![tool]);
        let calls = vec![
            ToolCall::new("slow").with_arg("query", "1"),
            ToolCall::new("slow").with_arg("query", "2"),
        ];
        let token = CancellationToken::new();
        let canceller = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                token.cancel();
            })
        };

        let start = Instant::now();
        let outcome = executor.execute_all(&calls, &token).await;
        canceller.await.unwrap();

        assert_eq!(outcome.unwrap_err(), ExecutionCancelled);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_already_cancelled_token() {
        let executor = executor_with(vec![Arc::new(RecordingTool::new("search", 0))]);
        let token = CancellationToken::new();
        token.cancel();

        let call = ToolCall::new("search").with_arg("query", "x");
        assert!(executor.execute_one(&call, &token).await.is_err());
        assert!(executor.execute_sequential(&[call], &token).await.is_err());
    }

    #[tokio::test]
    async fn test_late_registration_is_visible() {
        let executor = executor_with(vec![]);
        assert!(!executor.has_tool("search"));

        executor.catalog_handle().register(
            Arc::new(RecordingTool::new("search", 0)),
            Some(ToolMetadata::new("search", "Search", ToolCategory::Retrieval)),
        );

        assert!(executor.has_tool("search"));
        assert!(executor.catalog().is_retrieval("search"));
    }
}
