//! Embedding and generation providers backing the question-answering pipeline.

pub mod any;
pub mod error;
pub mod gemini;
pub mod http;
#[cfg(feature = "mock")]
pub mod mock;
pub mod provider;
mod retry;

pub use error::LlmError;
pub use provider::LlmProvider;
