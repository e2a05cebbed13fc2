//! Tool domain module
//!
//! This module defines the core abstractions of the **tool system**: how an
//! agent discovers, validates and invokes capabilities such as document
//! retrieval, code search, filesystem reads and memory operations.
//!
//! # Overview
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolCatalog  │───▶│ ToolCall     │───▶│ ToolResult   │
//! │ (registry)   │    │ (invocation) │    │ (output)     │
//! └──────┬───────┘    └──────────────┘    └──────────────┘
//!        │
//!        ├─ tools:    "search_documents" → Arc<dyn Tool>
//!        └─ metadata: category, tags, version
//! ```
//!
//! # Key Types
//!
//! - [`Tool`] — invocable capability with a [`ToolDefinition`]
//! - [`ToolCatalog`] — concurrent registry of tools and their [`ToolMetadata`]
//! - [`ToolCall`] — an invocation request; its [`cache_key`](ToolCall::cache_key)
//!   drives request-scoped deduplication
//! - [`ToolResult`] — success/failure outcome, with optional
//!   [`StructuredOutput`] for citation extraction
//! - [`ToolValidator`] — pure parameter validation
//!
//! # Architecture
//!
//! - **Domain** (this module): definitions, catalog, validation. No I/O.
//! - **Application** (`ToolExecutorPort`): execution boundary and cancellation
//! - **Infrastructure** (`CatalogToolExecutor`, builtin tools): concrete execution

pub mod catalog;
pub mod entities;
pub mod traits;
pub mod value_objects;

pub use catalog::{RegisteredTool, ToolCatalog};
pub use entities::{
    MIN_SCORE_ARG, ParamType, TENANT_ARG, TOP_K_ARG, ToolCall, ToolCategory, ToolDefinition,
    ToolMetadata, ToolParameter,
};
pub use traits::{DefaultToolValidator, Tool, ToolValidator, ValidationError};
pub use value_objects::{RetrievedDocument, StructuredOutput, ToolError, ToolOutput, ToolResult};
