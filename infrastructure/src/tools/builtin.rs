//! Builtin tool set
//!
//! Bundles the tools shipped with toolweave and registers them into a
//! [`ToolCatalog`]. The document index and memory store are shared handles,
//! so callers can keep loading documents after registration.

use super::file::{READ_FILE, ReadFileTool};
use super::memory::{MEMORY_RECALL, MEMORY_STORE, MemoryRecallTool, MemoryStore, MemoryStoreTool};
use super::retrieval::{DocumentIndex, DocumentSearchTool, SEARCH_DOCUMENTS};
use super::search::{GREP_SEARCH, GrepSearchTool};
use std::path::PathBuf;
use std::sync::Arc;
use toolweave_domain::tool::{Tool, ToolCatalog, ToolMetadata};
use tracing::{debug, warn};

/// Names of every builtin tool, in registration order
pub const BUILTIN_TOOLS: [&str; 5] = [
    SEARCH_DOCUMENTS,
    READ_FILE,
    GREP_SEARCH,
    MEMORY_STORE,
    MEMORY_RECALL,
];

pub struct BuiltinToolSet {
    root: PathBuf,
    index: Arc<DocumentIndex>,
    memory: Arc<MemoryStore>,
    /// Subset of [`BUILTIN_TOOLS`] to expose (None = all)
    enabled: Option<Vec<String>>,
}

impl BuiltinToolSet {
    /// Builtins whose filesystem tools are confined to `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: Arc::new(DocumentIndex::new()),
            memory: Arc::new(MemoryStore::new()),
            enabled: None,
        }
    }

    pub fn with_index(mut self, index: Arc<DocumentIndex>) -> Self {
        self.index = index;
        self
    }

    pub fn with_memory(mut self, memory: Arc<MemoryStore>) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_enabled<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        for name in &names {
            if !BUILTIN_TOOLS.contains(&name.as_str()) {
                warn!("Ignoring unknown builtin tool '{}'", name);
            }
        }
        self.enabled = Some(names);
        self
    }

    pub fn index(&self) -> Arc<DocumentIndex> {
        Arc::clone(&self.index)
    }

    fn is_enabled(&self, name: &str) -> bool {
        match &self.enabled {
            Some(names) => names.iter().any(|n| n == name),
            None => true,
        }
    }

    /// Enabled tools paired with their catalog metadata
    pub fn tools(&self) -> Vec<(Arc<dyn Tool>, ToolMetadata)> {
        let search = DocumentSearchTool::new(Arc::clone(&self.index));
        let read = ReadFileTool::new(self.root.clone());
        let grep = GrepSearchTool::new(self.root.clone());
        let store = MemoryStoreTool::new(Arc::clone(&self.memory));
        let recall = MemoryRecallTool::new(Arc::clone(&self.memory));

        let all: [(ToolMetadata, Arc<dyn Tool>); 5] = [
            (search.metadata(), Arc::new(search)),
            (read.metadata(), Arc::new(read)),
            (grep.metadata(), Arc::new(grep)),
            (store.metadata(), Arc::new(store)),
            (recall.metadata(), Arc::new(recall)),
        ];

        all.into_iter()
            .filter(|(metadata, _)| self.is_enabled(&metadata.name))
            .map(|(metadata, tool)| (tool, metadata))
            .collect()
    }

    /// Register the enabled tools, returning how many were added
    pub fn register_into(&self, catalog: &ToolCatalog) -> usize {
        let tools = self.tools();
        let count = tools.len();
        for (tool, metadata) in tools {
            debug!("Registering builtin tool {}", metadata.name);
            catalog.register(tool, Some(metadata));
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::CatalogToolExecutor;
    use crate::tools::retrieval::IndexedDocument;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use toolweave_application::{
        ChatCompletion, ChatGateway, ChatRequest, GatewayError, RunAgentInput, RunAgentUseCase,
    };
    use toolweave_domain::tool::{MIN_SCORE_ARG, TENANT_ARG, TOP_K_ARG, ToolCall, ToolCategory};
    use toolweave_domain::{AgentConfig, AgentOutcome, AgentResponse, ToolResult};

    #[test]
    fn test_registers_all_builtins() {
        let catalog = ToolCatalog::new();
        let added = BuiltinToolSet::new(".").register_into(&catalog);

        assert_eq!(added, BUILTIN_TOOLS.len());
        for name in BUILTIN_TOOLS {
            assert!(catalog.contains(name), "missing {}", name);
        }
        assert!(catalog.is_retrieval(SEARCH_DOCUMENTS));
        assert_eq!(catalog.list_by_category(ToolCategory::Memory).len(), 2);
    }

    #[test]
    fn test_enabled_filter() {
        let catalog = ToolCatalog::new();
        let added = BuiltinToolSet::new(".")
            .with_enabled(["read_file", "grep_search", "not_a_tool"])
            .register_into(&catalog);

        assert_eq!(added, 2);
        assert!(catalog.contains(READ_FILE));
        assert!(!catalog.contains(SEARCH_DOCUMENTS));
    }

    #[tokio::test]
    async fn test_index_is_shared_after_registration() {
        let catalog = ToolCatalog::new();
        let set = BuiltinToolSet::new(".");
        set.register_into(&catalog);
        set.index()
            .add(IndexedDocument::new("late.md", "added after registration"));

        let tool = catalog.get(SEARCH_DOCUMENTS).unwrap();
        let output = tool
            .invoke(&ToolCall::new(SEARCH_DOCUMENTS).with_arg("query", "registration"))
            .await
            .unwrap();
        assert!(output.content.contains("late.md"));
    }

    // ==================== Agent wiring ====================

    /// Gateway replaying canned model replies, shared across requests
    struct ScriptedGateway {
        replies: Mutex<VecDeque<String>>,
    }

    impl ScriptedGateway {
        fn new(replies: Vec<String>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
            })
        }
    }

    #[async_trait]
    impl ChatGateway for ScriptedGateway {
        async fn complete(&self, _request: &ChatRequest) -> Result<ChatCompletion, GatewayError> {
            let reply = self.replies.lock().unwrap().pop_front();
            Ok(ChatCompletion::text(reply.unwrap_or_else(|| "done".to_string())))
        }
    }

    fn call(tool: &str, arguments: Value) -> String {
        json!({"tool_calls": [{"tool_name": tool, "arguments": arguments}]}).to_string()
    }

    fn agent(
        set: &BuiltinToolSet,
        gateway: Arc<ScriptedGateway>,
    ) -> RunAgentUseCase<ScriptedGateway, CatalogToolExecutor> {
        let catalog = Arc::new(ToolCatalog::new());
        set.register_into(&catalog);
        RunAgentUseCase::new(gateway, Arc::new(CatalogToolExecutor::new(catalog)))
    }

    fn tool_results(response: &AgentResponse) -> Vec<&ToolResult> {
        response
            .messages
            .iter()
            .filter_map(|m| m.as_tool_result())
            .collect()
    }

    #[tokio::test]
    async fn test_agent_answers_from_tenant_documents() {
        let set = BuiltinToolSet::new(".");
        let index = set.index();
        index.add(IndexedDocument::new("refunds.md", "Refunds are issued within 14 days."));
        index.add(
            IndexedDocument::new("acme-policy.md", "Acme refunds require a receipt.")
                .with_tenant("acme"),
        );
        index.add(
            IndexedDocument::new("globex-policy.md", "Globex refunds need no receipt.")
                .with_tenant("globex"),
        );

        let gateway = ScriptedGateway::new(vec![
            call(SEARCH_DOCUMENTS, json!({"query": "refunds receipt"})),
            "Bring your receipt [acme-policy.md].".to_string(),
        ]);
        let response = agent(&set, gateway)
            .process(RunAgentInput::new("How do refunds work?").with_tenant("acme"))
            .await
            .unwrap();

        assert_eq!(response.outcome, AgentOutcome::Finalized);
        assert_eq!(response.answer, "Bring your receipt [acme-policy.md].");
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].get_string(TENANT_ARG), Some("acme"));

        let cited: Vec<(&str, f64)> = response
            .citations
            .iter()
            .map(|c| (c.document_id.as_str(), c.score))
            .collect();
        assert_eq!(cited, vec![("acme-policy.md", 1.0), ("refunds.md", 0.5)]);
        assert_eq!(response.metrics.documents_retrieved, 2);
        assert_eq!(response.retrieved_documents.len(), 1);
    }

    #[tokio::test]
    async fn test_agent_applies_configured_retrieval_limits() {
        let set = BuiltinToolSet::new(".");
        let index = set.index();
        index.add(IndexedDocument::new("a.md", "Our refund policy in full."));
        index.add(IndexedDocument::new("b.md", "Refund timelines vary."));

        let gateway = ScriptedGateway::new(vec![
            call(SEARCH_DOCUMENTS, json!({"query": "refund policy"})),
            "See a.md".to_string(),
        ]);
        let config = AgentConfig::default()
            .with_rag_top_k(1)
            .with_rag_min_score(0.9);
        let response = agent(&set, gateway)
            .process(RunAgentInput::new("refunds?").with_config(config))
            .await
            .unwrap();

        let executed = &response.tool_calls[0];
        assert_eq!(executed.get_i64(TOP_K_ARG), Some(1));
        assert_eq!(executed.get_f64(MIN_SCORE_ARG), Some(0.9));
        assert_eq!(response.citations.len(), 1);
        assert_eq!(response.citations[0].document_id, "a.md");
    }

    #[tokio::test]
    async fn test_agent_memory_is_isolated_per_tenant() {
        let set = BuiltinToolSet::new(".");
        let gateway = ScriptedGateway::new(vec![
            call(MEMORY_STORE, json!({"key": "plan", "value": "ship friday"})),
            "Noted.".to_string(),
            call(MEMORY_RECALL, json!({"key": "plan"})),
            "Nothing stored.".to_string(),
            call(MEMORY_RECALL, json!({"key": "plan"})),
            "Ship friday.".to_string(),
        ]);
        let use_case = agent(&set, gateway);

        let stored = use_case
            .process(RunAgentInput::new("remember the plan").with_tenant("acme"))
            .await
            .unwrap();
        assert!(tool_results(&stored)[0].is_success());

        let other = use_case
            .process(RunAgentInput::new("what is the plan?").with_tenant("globex"))
            .await
            .unwrap();
        let results = tool_results(&other);
        assert_eq!(results[0].error().unwrap().code, "NOT_FOUND");

        let owner = use_case
            .process(RunAgentInput::new("what is the plan?").with_tenant("acme"))
            .await
            .unwrap();
        assert_eq!(tool_results(&owner)[0].output(), Some("ship friday"));
    }
}
