use std::path::PathBuf;

use pelot_llm::gemini::{DEFAULT_BASE_URL, EmbedTask};
use pelot_memory::document::{DEFAULT_MAX_FILE_SIZE, IngestReport};
use serde::{Deserialize, Serialize};

use crate::vault::Secret;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(skip)]
    pub secrets: ResolvedSecrets,
}

/// LLM provider backend selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
}

impl ProviderKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default)]
    pub embedding_task: EmbedTask,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_model() -> String {
    "gemini-1.5-flash".into()
}

fn default_embedding_model() -> String {
    "text-embedding-004".into()
}

fn default_max_retries() -> u32 {
    2
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            base_url: default_base_url(),
            model: default_model(),
            embedding_model: default_embedding_model(),
            embedding_task: EmbedTask::default(),
            max_retries: default_max_retries(),
        }
    }
}

/// Vector store backend selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryBackend {
    #[default]
    Qdrant,
    Memory,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MemoryConfig {
    #[serde(default)]
    pub backend: MemoryBackend,
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_vector_size")]
    pub vector_size: u64,
    #[serde(default = "default_recall_limit")]
    pub recall_limit: u64,
}

fn default_qdrant_url() -> String {
    "http://localhost:6334".into()
}

fn default_collection() -> String {
    "pdf_embeddings".into()
}

fn default_vector_size() -> u64 {
    768
}

fn default_recall_limit() -> u64 {
    15
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: MemoryBackend::default(),
            qdrant_url: default_qdrant_url(),
            collection: default_collection(),
            vector_size: default_vector_size(),
            recall_limit: default_recall_limit(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct IngestConfig {
    #[serde(default = "default_folder")]
    pub folder: PathBuf,
    #[serde(default = "default_chunks_file")]
    pub chunks_file: PathBuf,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Set to 0 to disable pre-splitting long sentences.
    #[serde(default = "default_sentence_max_length")]
    pub sentence_max_length: usize,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_folder() -> PathBuf {
    PathBuf::from("data")
}

fn default_chunks_file() -> PathBuf {
    PathBuf::from("chunks.json")
}

fn default_max_length() -> usize {
    1000
}

fn default_sentence_max_length() -> usize {
    2000
}

fn default_extensions() -> Vec<String> {
    vec!["pdf".into()]
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            folder: default_folder(),
            chunks_file: default_chunks_file(),
            max_length: default_max_length(),
            sentence_max_length: default_sentence_max_length(),
            extensions: default_extensions(),
            max_file_size: default_max_file_size(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PromptConfig {
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,
    /// Send `System_Prompt` as a system instruction. Off: only the filled
    /// `prompt_instructions` reach the model.
    #[serde(default)]
    pub send_system_prompt: bool,
}

fn default_template_path() -> PathBuf {
    PathBuf::from("prompt_template.yml")
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template_path: default_template_path(),
            send_system_prompt: false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    #[serde(default = "default_gateway_max_body")]
    pub max_body_size: usize,
}

fn default_gateway_bind() -> String {
    "127.0.0.1".into()
}

fn default_gateway_port() -> u16 {
    8501
}

fn default_gateway_max_body() -> usize {
    65_536
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_gateway_bind(),
            port: default_gateway_port(),
            max_body_size: default_gateway_max_body(),
        }
    }
}

/// Text shown on the web page.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiConfig {
    pub title: String,
    pub page_title: String,
    pub subtitle: String,
    pub question_label: String,
    pub question_placeholder: String,
    pub answer_heading: String,
    pub answer_placeholder: String,
    pub empty_question_warning: String,
    pub submit_label: String,
    pub ingest_label: String,
    pub ingest_busy: String,
    pub ingest_heading: String,
    /// Followed by the processed document names.
    pub ingest_processed: String,
    pub ingest_nothing_new: String,
}

impl UiConfig {
    #[must_use]
    pub fn ingest_status(&self, report: &IngestReport) -> String {
        report.status_message(&self.ingest_processed, &self.ingest_nothing_new)
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: "Pelot.ai 👸🧁🐜".into(),
            page_title: "Pelot.ai - Descubra Pelotas".into(),
            subtitle: "Faça perguntas sobre a história da cidade de Pelotas!".into(),
            question_label: "Insira aqui sua pergunta:".into(),
            question_placeholder: "Digite sua pergunta aqui...".into(),
            answer_heading: "Resposta:".into(),
            answer_placeholder: "Sua resposta aparecerá aqui....".into(),
            empty_question_warning: "Faça uma pergunta!.".into(),
            submit_label: "Enviar".into(),
            ingest_label: "Processar PDFs".into(),
            ingest_busy: "Processando PDFs. Por favor, aguarde...".into(),
            ingest_heading: "Status do Processamento de PDFs:".into(),
            ingest_processed: "Processados os seguintes PDFs:".into(),
            ingest_nothing_new: "Todos os PDFs já foram processados.".into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ResolvedSecrets {
    pub genai_api_key: Option<Secret>,
}
