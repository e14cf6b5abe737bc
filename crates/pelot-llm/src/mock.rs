//! Test-only mock provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::LlmError;
use crate::provider::{LlmProvider, Message};

#[derive(Debug, Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<Vec<Vec<Message>>>>,
    embed_calls: Arc<AtomicUsize>,
    pub default_response: String,
    pub embedding: Vec<f32>,
    pub fail_chat: bool,
    pub fail_embed: bool,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            embed_calls: Arc::new(AtomicUsize::new(0)),
            default_response: "mock response".into(),
            embedding: vec![0.1, 0.2, 0.3, 0.4],
            fail_chat: false,
            fail_embed: false,
        }
    }
}

impl MockProvider {
    #[must_use]
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_chat: true,
            fail_embed: true,
            ..Self::default()
        }
    }

    /// Messages received by every `chat` call so far, oldest first.
    #[must_use]
    pub fn recorded_prompts(&self) -> Vec<Vec<Message>> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }
}

impl LlmProvider for MockProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(messages.to_vec());
        }
        if self.fail_chat {
            return Err(LlmError::Other("mock LLM error".into()));
        }
        let mut responses = self
            .responses
            .lock()
            .map_err(|e| LlmError::Other(e.to_string()))?;
        if responses.is_empty() {
            Ok(self.default_response.clone())
        } else {
            Ok(responses.remove(0))
        }
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, LlmError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_embed {
            return Err(LlmError::Other("mock embed error".into()));
        }
        Ok(self.embedding.clone())
    }

    fn supports_embeddings(&self) -> bool {
        true
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn responses_are_consumed_in_order() {
        let mock = MockProvider::with_responses(vec!["first".into(), "second".into()]);
        assert_eq!(mock.chat(&[Message::user("a")]).await.unwrap(), "first");
        assert_eq!(mock.chat(&[Message::user("b")]).await.unwrap(), "second");
        assert_eq!(mock.chat(&[Message::user("c")]).await.unwrap(), "mock response");
        assert_eq!(mock.recorded_prompts().len(), 3);
    }

    #[tokio::test]
    async fn failing_mock_errors() {
        let mock = MockProvider::failing();
        assert!(mock.chat(&[Message::user("a")]).await.is_err());
        assert!(mock.embed("a").await.is_err());
        assert_eq!(mock.embed_calls(), 1);
    }
}
