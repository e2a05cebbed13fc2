//! Chat gateway adapters
//!
//! Concrete [`ChatGateway`](toolweave_application::ChatGateway)
//! implementations. Each provider sits behind a cargo feature.

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAiGateway, OpenAiSettings};
