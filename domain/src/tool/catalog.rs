//! Tool Catalog
//!
//! The [`ToolCatalog`] is the process-lifetime registry of invocable tools.
//! It is constructed once, wrapped in an `Arc`, and shared by every
//! orchestration request. Registration and lookup are safe to call
//! concurrently; callers never lock anything themselves.
//!
//! # Usage
//!
//! ```ignore
//! let catalog = Arc::new(ToolCatalog::new());
//! catalog.register(Arc::new(DocumentSearchTool::new(index)), Some(metadata));
//!
//! let tool = catalog.get("search_documents");
//! let retrieval = catalog.list_by_category(ToolCategory::Retrieval);
//! ```
//!
//! Registering a name twice silently replaces the earlier tool. Views
//! returned by `list_*` and `search` are owned snapshots, so a concurrent
//! registration never disturbs an iteration in progress.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::entities::{ToolCategory, ToolDefinition, ToolMetadata};
use super::traits::Tool;

/// A tool together with the metadata it was registered with
#[derive(Clone)]
pub struct RegisteredTool {
    pub tool: Arc<dyn Tool>,
    pub metadata: ToolMetadata,
}

impl RegisteredTool {
    pub fn definition(&self) -> &ToolDefinition {
        self.tool.definition()
    }
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("name", &self.metadata.name)
            .field("category", &self.metadata.category)
            .finish()
    }
}

/// Concurrent registry of tools keyed by unique name
#[derive(Default)]
pub struct ToolCatalog {
    entries: RwLock<HashMap<String, RegisteredTool>>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a tool under its name.
    ///
    /// Without metadata, a `custom` entry is synthesized from the tool's
    /// own name and description.
    pub fn register(&self, tool: Arc<dyn Tool>, metadata: Option<ToolMetadata>) {
        let name = tool.name().to_string();
        let mut metadata =
            metadata.unwrap_or_else(|| ToolMetadata::from_definition(tool.definition()));
        metadata.name = name.clone();

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let replaced = entries
            .insert(name.clone(), RegisteredTool { tool, metadata })
            .is_some();
        if replaced {
            debug!(tool = %name, "Replaced previously registered tool");
        } else {
            debug!(tool = %name, "Registered tool");
        }
    }

    /// Remove a tool, returning it if it was present
    pub fn unregister(&self, name: &str) -> Option<RegisteredTool> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.entry(name).map(|e| e.tool)
    }

    pub fn entry(&self, name: &str) -> Option<RegisteredTool> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn metadata(&self, name: &str) -> Option<ToolMetadata> {
        self.entry(name).map(|e| e.metadata)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Whether `name` is registered as a retrieval tool
    pub fn is_retrieval(&self, name: &str) -> bool {
        self.metadata(name).is_some_and(|m| m.is_retrieval())
    }

    /// Whether calls to `name` must carry the requesting tenant's scope
    pub fn is_tenant_scoped(&self, name: &str) -> bool {
        self.metadata(name).is_some_and(|m| m.is_tenant_scoped())
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every registered tool, sorted by name
    pub fn list_all(&self) -> Vec<RegisteredTool> {
        self.snapshot(|_| true)
    }

    /// Snapshot of tools in one category, sorted by name
    pub fn list_by_category(&self, category: ToolCategory) -> Vec<RegisteredTool> {
        self.snapshot(|e| e.metadata.category == category)
    }

    /// Case-insensitive substring search over name, description and tags
    pub fn search(&self, query: &str) -> Vec<RegisteredTool> {
        let needle = query.to_lowercase();
        self.snapshot(|e| e.metadata.matches_lowercase(&needle))
    }

    /// Definitions of every registered tool, sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.list_all()
            .iter()
            .map(|e| e.definition().clone())
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.list_all().into_iter().map(|e| e.metadata.name).collect()
    }

    fn snapshot(&self, filter: impl Fn(&RegisteredTool) -> bool) -> Vec<RegisteredTool> {
        let mut tools: Vec<RegisteredTool> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|e| filter(e))
            .cloned()
            .collect();
        tools.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
        tools
    }
}

impl std::fmt::Debug for ToolCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolCatalog")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::ToolCall;
    use crate::tool::value_objects::{ToolError, ToolOutput};
    use async_trait::async_trait;

    struct StaticTool {
        definition: ToolDefinition,
        reply: String,
    }

    impl StaticTool {
        fn new(name: &str, description: &str, reply: &str) -> Arc<dyn Tool> {
            Arc::new(Self {
                definition: ToolDefinition::new(name, description),
                reply: reply.to_string(),
            })
        }
    }

    #[async_trait]
    impl Tool for StaticTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn invoke(&self, _call: &ToolCall) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::text(&self.reply))
        }
    }

    #[test]
    fn test_register_and_get() {
        let catalog = ToolCatalog::new();
        catalog.register(StaticTool::new("alpha", "First", "a"), None);

        assert!(catalog.contains("alpha"));
        assert_eq!(catalog.get("alpha").unwrap().name(), "alpha");
        assert!(catalog.get("missing").is_none());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_default_metadata_is_custom() {
        let catalog = ToolCatalog::new();
        catalog.register(StaticTool::new("alpha", "First tool", "a"), None);

        let meta = catalog.metadata("alpha").unwrap();
        assert_eq!(meta.category, ToolCategory::Custom);
        assert_eq!(meta.description, "First tool");
        assert!(meta.tags.is_empty());
    }

    #[tokio::test]
    async fn test_reregister_replaces_entry() {
        let catalog = ToolCatalog::new();
        catalog.register(StaticTool::new("alpha", "old", "old reply"), None);
        catalog.register(
            StaticTool::new("alpha", "new", "new reply"),
            Some(ToolMetadata::new("alpha", "new", ToolCategory::Retrieval)),
        );

        assert_eq!(catalog.len(), 1);
        assert!(catalog.is_retrieval("alpha"));
        let output = catalog
            .get("alpha")
            .unwrap()
            .invoke(&ToolCall::new("alpha"))
            .await
            .unwrap();
        assert_eq!(output.content, "new reply");
    }

    #[test]
    fn test_tenant_scoped_categories() {
        let catalog = ToolCatalog::new();
        for (name, category) in [
            ("docs", ToolCategory::Retrieval),
            ("notes", ToolCategory::Memory),
            ("grep", ToolCategory::CodeAnalysis),
        ] {
            catalog.register(
                StaticTool::new(name, "tool", "reply"),
                Some(ToolMetadata::new(name, "tool", category)),
            );
        }

        assert!(catalog.is_tenant_scoped("docs"));
        assert!(catalog.is_tenant_scoped("notes"));
        assert!(!catalog.is_tenant_scoped("grep"));
        assert!(!catalog.is_tenant_scoped("missing"));
    }

    #[test]
    fn test_metadata_name_follows_tool_name() {
        let catalog = ToolCatalog::new();
        catalog.register(
            StaticTool::new("alpha", "First", "a"),
            Some(ToolMetadata::new("something-else", "First", ToolCategory::Memory)),
        );
        assert_eq!(catalog.metadata("alpha").unwrap().name, "alpha");
    }

    #[test]
    fn test_list_by_category_and_sorted_snapshot() {
        let catalog = ToolCatalog::new();
        catalog.register(
            StaticTool::new("zeta", "z", "z"),
            Some(ToolMetadata::new("zeta", "z", ToolCategory::Filesystem)),
        );
        catalog.register(
            StaticTool::new("beta", "b", "b"),
            Some(ToolMetadata::new("beta", "b", ToolCategory::Filesystem)),
        );
        catalog.register(StaticTool::new("alpha", "a", "a"), None);

        let names: Vec<_> = catalog.list_all().into_iter().map(|e| e.metadata.name).collect();
        assert_eq!(names, vec!["alpha", "beta", "zeta"]);

        let fs: Vec<_> = catalog
            .list_by_category(ToolCategory::Filesystem)
            .into_iter()
            .map(|e| e.metadata.name)
            .collect();
        assert_eq!(fs, vec!["beta", "zeta"]);
        assert!(catalog.list_by_category(ToolCategory::Retrieval).is_empty());
    }

    #[test]
    fn test_search_matches_name_description_and_tags() {
        let catalog = ToolCatalog::new();
        catalog.register(
            StaticTool::new("search_documents", "Find passages in the corpus", "x"),
            Some(
                ToolMetadata::new("search_documents", "Find passages", ToolCategory::Retrieval)
                    .with_tags(["RAG", "vector"]),
            ),
        );
        catalog.register(StaticTool::new("grep_search", "Regex search in code", "x"), None);
        catalog.register(StaticTool::new("memory_store", "Remember a note", "x"), None);

        assert_eq!(catalog.search("SEARCH").len(), 2);
        assert_eq!(catalog.search("rag").len(), 1);
        assert_eq!(catalog.search("remember").len(), 1);
        assert!(catalog.search("nothing-matches").is_empty());
    }

    #[test]
    fn test_snapshot_is_detached_from_later_registrations() {
        let catalog = ToolCatalog::new();
        catalog.register(StaticTool::new("alpha", "a", "a"), None);
        let snapshot = catalog.list_all();

        catalog.register(StaticTool::new("beta", "b", "b"), None);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_unregister() {
        let catalog = ToolCatalog::new();
        catalog.register(StaticTool::new("alpha", "a", "a"), None);
        assert!(catalog.unregister("alpha").is_some());
        assert!(catalog.unregister("alpha").is_none());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_concurrent_registration_and_lookup() {
        let catalog = Arc::new(ToolCatalog::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let catalog = Arc::clone(&catalog);
                std::thread::spawn(move || {
                    let name = format!("tool_{}", i);
                    catalog.register(StaticTool::new(&name, "concurrent", "x"), None);
                    assert!(catalog.get(&name).is_some());
                    catalog.list_all().len()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap() >= 1);
        }
        assert_eq!(catalog.len(), 8);
    }
}
