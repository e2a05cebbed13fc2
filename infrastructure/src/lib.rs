//! Infrastructure layer for toolweave
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the catalog-backed tool executor, the builtin
//! tools, chat gateways, configuration loading and transcript logging.

pub mod config;
pub mod logging;
pub mod providers;
pub mod tools;

// Re-export commonly used types
pub use config::{ConfigError, ConfigLoader, FileConfig, FileProviderConfig, FileToolsConfig};
pub use logging::JsonlTranscriptWriter;
#[cfg(feature = "openai")]
pub use providers::{OpenAiGateway, OpenAiSettings};
pub use tools::{
    BUILTIN_TOOLS, BuiltinToolSet, CatalogToolExecutor, DocumentIndex, DocumentSearchTool,
    IndexedDocument, MemoryStore,
};
