use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::provider::{LlmProvider, Message, Role};
use crate::retry::send_with_retry;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MAX_RETRIES: u32 = 2;
const PROVIDER: &str = "gemini";

/// Task hint sent with every embedding request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedTask {
    #[default]
    RetrievalQuery,
    RetrievalDocument,
    SemanticSimilarity,
    Classification,
    Clustering,
}

impl EmbedTask {
    #[must_use]
    pub fn as_api_str(self) -> &'static str {
        match self {
            Self::RetrievalQuery => "RETRIEVAL_QUERY",
            Self::RetrievalDocument => "RETRIEVAL_DOCUMENT",
            Self::SemanticSimilarity => "SEMANTIC_SIMILARITY",
            Self::Classification => "CLASSIFICATION",
            Self::Clustering => "CLUSTERING",
        }
    }
}

#[derive(Clone)]
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    embedding_model: Option<String>,
    embed_task: EmbedTask,
    max_retries: u32,
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("embedding_model", &self.embedding_model)
            .field("embed_task", &self.embed_task)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl GeminiProvider {
    #[must_use]
    pub fn new(
        api_key: String,
        mut base_url: String,
        model: String,
        embedding_model: Option<String>,
    ) -> Self {
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: crate::http::default_client(),
            api_key,
            base_url,
            model: strip_models_prefix(&model).to_owned(),
            embedding_model: embedding_model.map(|m| strip_models_prefix(&m).to_owned()),
            embed_task: EmbedTask::default(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn with_embed_task(mut self, task: EmbedTask) -> Self {
        self.embed_task = task;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<String, LlmError> {
        let response = send_with_retry(PROVIDER, self.max_retries, || {
            self.client
                .post(url)
                .header("x-goog-api-key", &self.api_key)
                .header("Content-Type", "application/json")
                .json(body)
                .send()
        })
        .await?;

        let status = response.status();
        let text = response.text().await.map_err(LlmError::Http)?;

        if !status.is_success() {
            tracing::error!("Gemini API error {status}: {text}");
            return Err(LlmError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        Ok(text)
    }
}

fn strip_models_prefix(model: &str) -> &str {
    model.strip_prefix("models/").unwrap_or(model)
}

impl LlmProvider for GeminiProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        let body = build_generate_request(messages);
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let text = self.post_json(&url, &body).await?;

        let resp: GenerateResponse = serde_json::from_str(&text)?;
        resp.first_text().ok_or(LlmError::EmptyResponse { provider: PROVIDER })
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let model = self
            .embedding_model
            .as_deref()
            .ok_or(LlmError::EmbedUnsupported { provider: PROVIDER })?;

        let body = EmbedRequest {
            model: format!("models/{model}"),
            content: Content {
                role: None,
                parts: vec![Part { text }],
            },
            task_type: self.embed_task.as_api_str(),
        };
        let url = format!("{}/models/{model}:embedContent", self.base_url);
        let raw = self.post_json(&url, &body).await?;

        let resp: EmbedResponse = serde_json::from_str(&raw)?;
        if resp.embedding.values.is_empty() {
            return Err(LlmError::EmptyResponse { provider: PROVIDER });
        }
        Ok(resp.embedding.values)
    }

    fn supports_embeddings(&self) -> bool {
        self.embedding_model.is_some()
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        PROVIDER
    }
}

fn build_generate_request(messages: &[Message]) -> GenerateRequest<'_> {
    let system: Vec<Part<'_>> = messages
        .iter()
        .filter(|m| m.role == Role::System && !m.content.is_empty())
        .map(|m| Part { text: &m.content })
        .collect();

    let contents = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| Content {
            role: Some(match m.role {
                Role::Assistant => "model",
                Role::User | Role::System => "user",
            }),
            parts: vec![Part { text: &m.content }],
        })
        .collect();

    GenerateRequest {
        contents,
        system_instruction: (!system.is_empty()).then_some(Content {
            role: None,
            parts: system,
        }),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest<'a> {
    model: String,
    content: Content<'a>,
    task_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate, if it produced any.
    fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!content.parts.is_empty()).then_some(text)
    }
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}
