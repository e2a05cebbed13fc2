//! Memory tools: memory_store / memory_recall
//!
//! Notes outlive a single request and are keyed by tenant. The agent loop
//! scopes memory calls to the requesting tenant, so one tenant cannot read
//! another's notes. Calls without a tenant share a global slot.

use async_trait::async_trait;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};
use toolweave_domain::tool::{
    TENANT_ARG, Tool, ToolCall, ToolCategory, ToolDefinition, ToolError, ToolMetadata, ToolOutput,
    ToolParameter,
};

pub const MEMORY_STORE: &str = "memory_store";
pub const MEMORY_RECALL: &str = "memory_recall";

/// Tenant-keyed note storage shared by both memory tools
#[derive(Debug, Default)]
pub struct MemoryStore {
    notes: RwLock<HashMap<Option<String>, BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a note, returning the previous value under the same key
    pub fn put(&self, tenant: Option<&str>, key: &str, value: &str) -> Option<String> {
        self.notes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(tenant.map(str::to_string))
            .or_default()
            .insert(key.to_string(), value.to_string())
    }

    pub fn get(&self, tenant: Option<&str>, key: &str) -> Option<String> {
        self.notes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&tenant.map(str::to_string))
            .and_then(|notes| notes.get(key).cloned())
    }

    /// Keys stored for a tenant, sorted
    pub fn keys(&self, tenant: Option<&str>) -> Vec<String> {
        self.notes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&tenant.map(str::to_string))
            .map(|notes| notes.keys().cloned().collect())
            .unwrap_or_default()
    }
}

pub fn memory_store_definition() -> ToolDefinition {
    ToolDefinition::new(MEMORY_STORE, "Remember a note under a key for later turns")
        .with_parameter(ToolParameter::new("key", "Name of the note", true))
        .with_parameter(ToolParameter::new("value", "Content to remember", true))
        .with_parameter(ToolParameter::new(TENANT_ARG, "Tenant owning the note", false))
}

pub fn memory_recall_definition() -> ToolDefinition {
    ToolDefinition::new(
        MEMORY_RECALL,
        "Recall a remembered note by key, or list all keys when no key is given",
    )
    .with_parameter(ToolParameter::new("key", "Name of the note", false))
    .with_parameter(ToolParameter::new(TENANT_ARG, "Tenant owning the note", false))
}

pub struct MemoryStoreTool {
    definition: ToolDefinition,
    store: Arc<MemoryStore>,
}

impl MemoryStoreTool {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            definition: memory_store_definition(),
            store,
        }
    }

    pub fn metadata(&self) -> ToolMetadata {
        ToolMetadata::from_definition(&self.definition)
            .with_category(ToolCategory::Memory)
            .with_tags(["memory", "write"])
    }
}

#[async_trait]
impl Tool for MemoryStoreTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, call: &ToolCall) -> Result<ToolOutput, ToolError> {
        let key = call.require_string("key").map_err(ToolError::invalid_argument)?;
        let value = call.require_string("value").map_err(ToolError::invalid_argument)?;
        let tenant = call.get_string(TENANT_ARG);

        let message = match self.store.put(tenant, key, value) {
            Some(_) => format!("Updated note '{}'", key),
            None => format!("Stored note '{}'", key),
        };
        Ok(ToolOutput::text(message))
    }
}

pub struct MemoryRecallTool {
    definition: ToolDefinition,
    store: Arc<MemoryStore>,
}

impl MemoryRecallTool {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            definition: memory_recall_definition(),
            store,
        }
    }

    pub fn metadata(&self) -> ToolMetadata {
        ToolMetadata::from_definition(&self.definition)
            .with_category(ToolCategory::Memory)
            .with_tags(["memory", "read"])
    }
}

#[async_trait]
impl Tool for MemoryRecallTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, call: &ToolCall) -> Result<ToolOutput, ToolError> {
        let tenant = call.get_string(TENANT_ARG);

        match call.get_string("key") {
            Some(key) => self
                .store
                .get(tenant, key)
                .map(ToolOutput::text)
                .ok_or_else(|| ToolError::not_found(format!("note '{}'", key))),
            None => {
                let keys = self.store.keys(tenant);
                let content = if keys.is_empty() {
                    "No notes stored".to_string()
                } else {
                    keys.join("\n")
                };
                Ok(ToolOutput::text(content).with_json(json!({ "keys": keys })))
            }
        }
    }
}
