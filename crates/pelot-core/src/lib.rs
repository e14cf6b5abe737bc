//! Configuration, prompt templating, and the `Assistant` that answers questions
//! over ingested documents.

pub mod answer;
pub mod assistant;
pub mod bootstrap;
pub mod config;
pub mod prompt;
pub mod vault;

pub use assistant::{Assistant, AssistantError};
pub use config::Config;
pub use prompt::{PromptError, PromptTemplate, format_prompt};
