//! Application bootstrap: config resolution, provider, store and assistant construction.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use pelot_llm::any::AnyProvider;
use pelot_llm::gemini::GeminiProvider;
use pelot_memory::document::{
    DocumentLoader, IngestionPipeline, PdfLoader, SplitterConfig, TextLoader, TextSplitter,
};
use pelot_memory::{InMemoryVectorStore, QdrantOps, VectorStore};
use tokio::sync::watch;

use crate::assistant::{Assistant, AssistantSettings};
use crate::config::{Config, IngestConfig, MemoryBackend, ProviderKind};
use crate::vault::{EnvVaultProvider, VaultProvider};

const TEXT_EXTENSIONS: [&str; 3] = ["txt", "md", "markdown"];

pub struct AppBuilder {
    config: Config,
    config_path: PathBuf,
}

impl AppBuilder {
    /// Load config from `config_path` and resolve secrets from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or `GENAI_API_KEY` is missing.
    pub async fn from_path(config_path: PathBuf) -> anyhow::Result<Self> {
        Self::with_vault(config_path, &EnvVaultProvider).await
    }

    /// # Errors
    ///
    /// Returns an error if the config is invalid or the API key cannot be resolved.
    pub async fn with_vault(
        config_path: PathBuf,
        vault: &dyn VaultProvider,
    ) -> anyhow::Result<Self> {
        let mut config = Config::load(&config_path)?;
        config.resolve_secrets(vault).await?;
        tracing::info!(config = %config_path.display(), "configuration loaded");
        Ok(Self {
            config,
            config_path,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Build the provider, store and pipeline, and make sure the collection exists.
    ///
    /// # Errors
    ///
    /// Returns an error if any dependency cannot be created or the store is unreachable.
    pub async fn build_assistant(&self) -> anyhow::Result<Assistant> {
        let provider = create_provider(&self.config)?;
        let store = create_store(&self.config)?;
        let pipeline = create_pipeline(&self.config, Arc::clone(&store), &provider);
        let assistant = Assistant::new(
            provider,
            store,
            pipeline,
            AssistantSettings::from_config(&self.config),
        );
        assistant
            .prepare()
            .await
            .context("failed to prepare vector store collection")?;
        Ok(assistant)
    }

    #[must_use]
    pub fn build_shutdown() -> (watch::Sender<bool>, watch::Receiver<bool>) {
        watch::channel(false)
    }
}

/// Priority: `--config` argument > `PELOT_CONFIG` env > `config/default.toml`.
#[must_use]
pub fn resolve_config_path(cli: Option<PathBuf>) -> PathBuf {
    if let Some(path) = cli {
        return path;
    }
    if let Ok(path) = std::env::var("PELOT_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

/// # Errors
///
/// Returns an error if the API key has not been resolved.
pub fn create_provider(config: &Config) -> anyhow::Result<AnyProvider> {
    match config.llm.provider {
        ProviderKind::Gemini => {
            let api_key = config
                .secrets
                .genai_api_key
                .as_ref()
                .context("GENAI_API_KEY not resolved")?;
            let provider = GeminiProvider::new(
                api_key.expose().to_owned(),
                config.llm.base_url.clone(),
                config.llm.model.clone(),
                Some(config.llm.embedding_model.clone()),
            )
            .with_embed_task(config.llm.embedding_task)
            .with_max_retries(config.llm.max_retries);
            tracing::info!(
                model = %config.llm.model,
                embedding_model = %config.llm.embedding_model,
                "gemini provider configured"
            );
            Ok(AnyProvider::Gemini(provider))
        }
    }
}

/// # Errors
///
/// Returns an error if the Qdrant client cannot be created.
pub fn create_store(config: &Config) -> anyhow::Result<Arc<dyn VectorStore>> {
    match config.memory.backend {
        MemoryBackend::Qdrant => {
            let ops = QdrantOps::new(&config.memory.qdrant_url)
                .map_err(|e| anyhow::anyhow!("failed to create Qdrant client: {e}"))?;
            tracing::info!(url = %config.memory.qdrant_url, "using qdrant vector store");
            Ok(Arc::new(ops))
        }
        MemoryBackend::Memory => {
            tracing::warn!("using in-memory vector store; ingested chunks are lost on exit");
            Ok(Arc::new(InMemoryVectorStore::new()))
        }
    }
}

#[must_use]
pub fn splitter_config(ingest: &IngestConfig) -> SplitterConfig {
    SplitterConfig {
        max_length: ingest.max_length,
        sentence_max_length: (ingest.sentence_max_length > 0)
            .then_some(ingest.sentence_max_length),
    }
}

/// Loaders for the configured extensions. Unknown extensions are ignored with a warning.
#[must_use]
pub fn create_loaders(ingest: &IngestConfig) -> Vec<Box<dyn DocumentLoader>> {
    let mut wants_pdf = false;
    let mut wants_text = false;
    for ext in &ingest.extensions {
        if ext.eq_ignore_ascii_case("pdf") {
            wants_pdf = true;
        } else if TEXT_EXTENSIONS.iter().any(|t| t.eq_ignore_ascii_case(ext)) {
            wants_text = true;
        } else {
            tracing::warn!("no loader for extension {ext:?}, ignoring");
        }
    }

    let mut loaders: Vec<Box<dyn DocumentLoader>> = Vec::new();
    if wants_pdf {
        loaders.push(Box::new(PdfLoader {
            max_file_size: ingest.max_file_size,
        }));
    }
    if wants_text {
        loaders.push(Box::new(TextLoader {
            max_file_size: ingest.max_file_size,
        }));
    }
    loaders
}

#[must_use]
pub fn create_pipeline(
    config: &Config,
    store: Arc<dyn VectorStore>,
    provider: &AnyProvider,
) -> IngestionPipeline {
    IngestionPipeline::new(
        TextSplitter::new(splitter_config(&config.ingest)),
        store,
        config.memory.collection.clone(),
        Box::new(provider.embed_fn()),
    )
    .with_loaders(create_loaders(&config.ingest))
    .with_chunks_file(config.ingest.chunks_file.clone())
}
