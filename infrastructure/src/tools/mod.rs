//! Tool implementations for the agent system
//!
//! - `executor`: [`CatalogToolExecutor`], the concrete `ToolExecutorPort`
//! - `builtin`: [`BuiltinToolSet`], registering the tools below
//! - `retrieval`, `file`, `search`, `memory`: the builtin tools themselves

pub mod builtin;
pub mod file;
pub mod memory;
pub mod retrieval;
pub mod search;

mod executor;

pub use builtin::{BUILTIN_TOOLS, BuiltinToolSet};
pub use executor::CatalogToolExecutor;
pub use memory::MemoryStore;
pub use retrieval::{DocumentIndex, DocumentSearchTool, IndexedDocument};
