//! Retrieval tool: search_documents over an in-memory keyword index
//!
//! Documents are scoped by tenant. A document without a tenant is global:
//! every search sees it. A tenant-scoped search additionally sees that
//! tenant's documents, and never another tenant's.

use async_trait::async_trait;
use glob::glob;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use toolweave_domain::core::string::{single_line, truncate};
use toolweave_domain::tool::{
    MIN_SCORE_ARG, ParamType, RetrievedDocument, TENANT_ARG, TOP_K_ARG, Tool, ToolCall,
    ToolCategory, ToolDefinition, ToolError, ToolMetadata, ToolOutput, ToolParameter,
};
use tracing::{debug, warn};

/// Tool name constant
pub const SEARCH_DOCUMENTS: &str = "search_documents";

/// Page separator used when loading documents from disk (form feed)
const PAGE_BREAK: char = '\x0c';

/// Snippet length in the text listing returned to the model
const SNIPPET_LEN: usize = 240;

/// Get the tool definition for search_documents
pub fn search_documents_definition() -> ToolDefinition {
    ToolDefinition::new(
        SEARCH_DOCUMENTS,
        "Search the document knowledge base and return the best matching passages",
    )
    .with_parameter(ToolParameter::new("query", "Free-text search query", true))
    .with_parameter(
        ToolParameter::new(TOP_K_ARG, "Maximum number of passages to return", false)
            .with_type(ParamType::Number)
            .with_default(5),
    )
    .with_parameter(
        ToolParameter::new(
            MIN_SCORE_ARG,
            "Minimum relevance score between 0 and 1",
            false,
        )
        .with_type(ParamType::Number)
        .with_default(0.0),
    )
    .with_parameter(ToolParameter::new(
        TENANT_ARG,
        "Tenant whose documents may be searched",
        false,
    ))
}

/// One searchable passage (a whole document or a single page of one)
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedDocument {
    pub id: String,
    pub tenant_id: Option<String>,
    pub page: Option<u32>,
    pub text: String,
}

impl IndexedDocument {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tenant_id: None,
            page: None,
            text: text.into(),
        }
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    fn visible_to(&self, tenant: Option<&str>) -> bool {
        match (&self.tenant_id, tenant) {
            (None, _) => true,
            (Some(owner), Some(t)) => owner == t,
            (Some(_), None) => false,
        }
    }
}

/// Thread-safe keyword index
#[derive(Debug, Default)]
pub struct DocumentIndex {
    documents: RwLock<Vec<IndexedDocument>>,
}

impl DocumentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, document: IndexedDocument) {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(document);
    }

    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load every `*.txt` and `*.md` file under `dir` (recursively).
    ///
    /// The document id is the path relative to `dir`. Files containing form
    /// feeds are split into numbered pages starting at 1. Returns the number
    /// of passages added.
    pub fn load_dir(&self, dir: &Path, tenant: Option<&str>) -> Result<usize, ToolError> {
        if !dir.is_dir() {
            return Err(ToolError::not_found(dir.display().to_string()));
        }

        let mut added = 0;
        for ext in ["txt", "md"] {
            let pattern = format!("{}/**/*.{}", dir.display(), ext);
            let paths = glob(&pattern).map_err(|e| {
                ToolError::execution_failed(format!("Invalid document pattern: {}", e))
            })?;

            for path in paths.flatten() {
                let content = match fs::read_to_string(&path) {
                    Ok(c) => c,
                    Err(e) => {
                        warn!("Skipping unreadable document {}: {}", path.display(), e);
                        continue;
                    }
                };
                let id = path
                    .strip_prefix(dir)
                    .unwrap_or(path.as_path())
                    .display()
                    .to_string();

                let pages: Vec<&str> = content.split(PAGE_BREAK).collect();
                for (i, page_text) in pages.iter().enumerate() {
                    if page_text.trim().is_empty() {
                        continue;
                    }
                    let mut doc = IndexedDocument::new(&id, page_text.trim());
                    if pages.len() > 1 {
                        doc = doc.with_page(i as u32 + 1);
                    }
                    if let Some(t) = tenant {
                        doc = doc.with_tenant(t);
                    }
                    self.add(doc);
                    added += 1;
                }
            }
        }

        debug!("Loaded {} passages from {}", added, dir.display());
        Ok(added)
    }

    /// Keyword search.
    ///
    /// The score is the fraction of distinct query terms present in the
    /// passage. Results are ordered by score (descending), then id and page.
    pub fn search(
        &self,
        query: &str,
        top_k: usize,
        min_score: f64,
        tenant: Option<&str>,
    ) -> Vec<(IndexedDocument, f64)> {
        let terms: HashSet<String> = tokenize(query).collect();
        if terms.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let docs = self.documents.read().unwrap_or_else(PoisonError::into_inner);

        let mut hits: Vec<(IndexedDocument, f64)> = docs
            .iter()
            .filter(|d| d.visible_to(tenant))
            .filter_map(|d| {
                let words: HashSet<String> = tokenize(&d.text).collect();
                let matched = terms.iter().filter(|t| words.contains(*t)).count();
                if matched == 0 {
                    return None;
                }
                let score = matched as f64 / terms.len() as f64;
                (score >= min_score).then(|| (d.clone(), score))
            })
            .collect();

        hits.sort_by(|(a, sa), (b, sb)| {
            sb.total_cmp(sa)
                .then_with(|| a.id.cmp(&b.id))
                .then_with(|| a.page.cmp(&b.page))
        });
        hits.truncate(top_k);
        hits
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// search_documents tool backed by a shared [`DocumentIndex`]
pub struct DocumentSearchTool {
    definition: ToolDefinition,
    index: Arc<DocumentIndex>,
}

impl DocumentSearchTool {
    pub fn new(index: Arc<DocumentIndex>) -> Self {
        Self {
            definition: search_documents_definition(),
            index,
        }
    }

    pub fn metadata(&self) -> ToolMetadata {
        ToolMetadata::from_definition(&self.definition)
            .with_category(ToolCategory::Retrieval)
            .with_tags(["rag", "documents", "search"])
    }
}

#[async_trait]
impl Tool for DocumentSearchTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, call: &ToolCall) -> Result<ToolOutput, ToolError> {
        let query = call.require_string("query").map_err(ToolError::invalid_argument)?;
        let top_k = call.get_i64(TOP_K_ARG).unwrap_or(5).max(0) as usize;
        let min_score = call.get_f64(MIN_SCORE_ARG).unwrap_or(0.0);
        let tenant = call.get_string(TENANT_ARG);

        let hits = self.index.search(query, top_k, min_score, tenant);
        debug!(
            "search_documents query={:?} tenant={:?} hits={}",
            query,
            tenant,
            hits.len()
        );

        if hits.is_empty() {
            return Ok(ToolOutput::text("No matching documents found").with_documents(Vec::new()));
        }

        let mut listing = Vec::with_capacity(hits.len());
        let mut documents = Vec::with_capacity(hits.len());
        for (i, (doc, score)) in hits.into_iter().enumerate() {
            let location = match doc.page {
                Some(p) => format!("{} (page {})", doc.id, p),
                None => doc.id.clone(),
            };
            listing.push(format!(
                "{}. {} [score {:.2}]\n   {}",
                i + 1,
                location,
                score,
                truncate(&single_line(&doc.text), SNIPPET_LEN)
            ));

            let mut retrieved = RetrievedDocument::new(doc.id, score).with_text(doc.text);
            if let Some(p) = doc.page {
                retrieved = retrieved.with_page(p);
            }
            documents.push(retrieved);
        }

        Ok(ToolOutput::text(listing.join("\n")).with_documents(documents))
    }
}
