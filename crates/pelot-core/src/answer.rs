//! Turning retrieved chunks into the context block and the model messages.

use pelot_llm::provider::Message;
use pelot_memory::QueryResult;

use crate::prompt::{PromptError, PromptTemplate};

const DOCUMENT_SEPARATOR: &str = "\n\n";

/// One retrieved result item: a single text, or a sequence of texts returned
/// together for one hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievedDocument {
    Text(String),
    Nested(Vec<String>),
}

impl RetrievedDocument {
    /// Nested sequences are joined with single spaces.
    #[must_use]
    pub fn flatten(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Nested(parts) => parts.join(" "),
        }
    }
}

impl From<String> for RetrievedDocument {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<String>> for RetrievedDocument {
    fn from(parts: Vec<String>) -> Self {
        Self::Nested(parts)
    }
}

/// Flatten every item and join them with a blank line.
#[must_use]
pub fn flatten_documents(documents: &[RetrievedDocument]) -> String {
    documents
        .iter()
        .map(RetrievedDocument::flatten)
        .collect::<Vec<_>>()
        .join(DOCUMENT_SEPARATOR)
}

/// Context block for a nearest-neighbor result, closest chunk first.
#[must_use]
pub fn context_block(result: &QueryResult) -> String {
    let documents: Vec<RetrievedDocument> = result
        .documents
        .iter()
        .cloned()
        .map(RetrievedDocument::from)
        .collect();
    flatten_documents(&documents)
}

/// Messages sent to the model: the filled instruction template as the single
/// user turn, preceded by the system prompt only when `with_system` is set and
/// the prompt is non-blank.
///
/// # Errors
///
/// Returns an error if the instruction template is malformed.
pub fn prompt_messages(
    template: &PromptTemplate,
    query: &str,
    context: &str,
    with_system: bool,
) -> Result<Vec<Message>, PromptError> {
    let prompt = template.render(query, context)?;
    let mut messages = Vec::with_capacity(2);
    if with_system && !template.system_prompt.trim().is_empty() {
        messages.push(Message::system(template.system_prompt.clone()));
    }
    messages.push(Message::user(prompt));
    Ok(messages)
}
