use std::path::{Path, PathBuf};
use std::sync::Arc;

use pelot_llm::LlmError;
use pelot_llm::any::AnyProvider;
use pelot_llm::provider::LlmProvider;
use pelot_memory::document::{DocumentError, IngestReport, IngestionPipeline};
use pelot_memory::{VectorStore, VectorStoreError};
use tokio::sync::Mutex;

use crate::answer::{context_block, prompt_messages};
use crate::config::Config;
use crate::prompt::{PromptError, PromptTemplate};

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("question is empty")]
    EmptyQuestion,
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("vector store error: {0}")]
    Store(#[from] VectorStoreError),
    #[error("ingestion error: {0}")]
    Document(#[from] DocumentError),
    #[error("prompt error: {0}")]
    Prompt(#[from] PromptError),
}

/// Values the query and ingestion paths read on every call.
#[derive(Debug, Clone)]
pub struct AssistantSettings {
    pub collection: String,
    pub vector_size: u64,
    pub recall_limit: u64,
    pub template_path: PathBuf,
    pub send_system_prompt: bool,
    pub folder: PathBuf,
}

impl AssistantSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            collection: config.memory.collection.clone(),
            vector_size: config.memory.vector_size,
            recall_limit: config.memory.recall_limit,
            template_path: config.prompt.template_path.clone(),
            send_system_prompt: config.prompt.send_system_prompt,
            folder: config.ingest.folder.clone(),
        }
    }
}

/// Owns the model client, the vector store and the ingestion pipeline, and
/// answers questions over whatever has been ingested.
pub struct Assistant {
    provider: AnyProvider,
    store: Arc<dyn VectorStore>,
    pipeline: IngestionPipeline,
    settings: AssistantSettings,
    ingest_lock: Mutex<()>,
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("provider", &self.provider.name())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Assistant {
    #[must_use]
    pub fn new(
        provider: AnyProvider,
        store: Arc<dyn VectorStore>,
        pipeline: IngestionPipeline,
        settings: AssistantSettings,
    ) -> Self {
        Self {
            provider,
            store,
            pipeline,
            settings,
            ingest_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    /// Create the collection if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    pub async fn prepare(&self) -> Result<(), AssistantError> {
        self.store
            .ensure_collection(&self.settings.collection, self.settings.vector_size)
            .await?;
        Ok(())
    }

    /// Answer `question` from the closest stored chunks.
    ///
    /// The prompt template is read from disk on every call.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::EmptyQuestion`] for blank input without contacting
    /// any service, otherwise any embedding, retrieval, template or generation error.
    pub async fn ask(&self, question: &str) -> Result<String, AssistantError> {
        if question.trim().is_empty() {
            return Err(AssistantError::EmptyQuestion);
        }

        let embedding = self.provider.embed(question).await?;
        let result = self
            .store
            .query(
                &self.settings.collection,
                embedding,
                self.settings.recall_limit,
            )
            .await?;
        tracing::debug!(
            hits = result.len(),
            distances = ?result.distances,
            sources = ?result.metadatas,
            "retrieved context"
        );

        let context = context_block(&result);
        let template = PromptTemplate::load(&self.settings.template_path).await?;
        let messages = prompt_messages(
            &template,
            question,
            &context,
            self.settings.send_system_prompt,
        )?;

        Ok(self.provider.chat(&messages).await?)
    }

    /// Ingest the configured folder.
    ///
    /// # Errors
    ///
    /// See [`Self::ingest_folder`].
    pub async fn ingest(&self) -> Result<IngestReport, AssistantError> {
        self.ingest_folder(&self.settings.folder).await
    }

    /// Ingest `folder`. Concurrent calls run one after another.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be read or any file fails to load,
    /// embed, or store.
    pub async fn ingest_folder(&self, folder: &Path) -> Result<IngestReport, AssistantError> {
        let _guard = self.ingest_lock.lock().await;
        let report = self.pipeline.ingest_folder(folder).await?;
        tracing::info!(
            processed = report.processed.len(),
            skipped = report.skipped.len(),
            chunks = report.chunks_written,
            "ingestion finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use pelot_llm::mock::MockProvider;
    use pelot_llm::provider::Role;
    use pelot_memory::InMemoryVectorStore;
    use pelot_memory::document::{SplitterConfig, TextLoader, TextSplitter};

    use super::*;

    struct Fixture {
        _dir: tempfile::TempDir,
        data: PathBuf,
        assistant: Assistant,
        mock: MockProvider,
    }

    async fn fixture(mock: MockProvider) -> Fixture {
        fixture_with(mock, false).await
    }

    async fn fixture_with(mock: MockProvider, send_system_prompt: bool) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        std::fs::create_dir(&data).unwrap();
        let template_path = dir.path().join("prompt_template.yml");
        std::fs::write(
            &template_path,
            "System_Prompt: Answer briefly.\nprompt_instructions: \"Q: {query}\\nCTX: {chunks}\"\n",
        )
        .unwrap();

        let provider = AnyProvider::Mock(mock.clone());
        let store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());
        let pipeline = IngestionPipeline::new(
            TextSplitter::new(SplitterConfig::default()),
            Arc::clone(&store),
            "pdf_embeddings",
            Box::new(provider.embed_fn()),
        )
        .with_loaders(vec![Box::new(TextLoader::default())])
        .with_chunks_file(dir.path().join("chunks.json"));

        let settings = AssistantSettings {
            collection: "pdf_embeddings".into(),
            vector_size: 4,
            recall_limit: 15,
            template_path,
            send_system_prompt,
            folder: data.clone(),
        };
        let assistant = Assistant::new(provider, store, pipeline, settings);
        assistant.prepare().await.unwrap();

        Fixture {
            _dir: dir,
            data,
            assistant,
            mock,
        }
    }

    #[tokio::test]
    async fn blank_question_never_reaches_services() {
        let mock = MockProvider::default();
        let f = fixture(mock.clone()).await;

        for question in ["", "   ", "\n\t"] {
            let err = f.assistant.ask(question).await.unwrap_err();
            assert!(matches!(err, AssistantError::EmptyQuestion));
        }
        assert_eq!(mock.embed_calls(), 0);
        assert!(mock.recorded_prompts().is_empty());
    }

    #[tokio::test]
    async fn ask_fills_template_with_retrieved_chunks() {
        let mock = MockProvider::with_responses(vec!["It was founded in 1812.".into()]);
        let f = fixture(mock.clone()).await;
        std::fs::write(f.data.join("history.txt"), "Pelotas was founded in 1812.").unwrap();
        f.assistant.ingest().await.unwrap();

        let answer = f.assistant.ask("When was it founded?").await.unwrap();
        assert_eq!(answer, "It was founded in 1812.");

        let prompts = mock.recorded_prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].len(), 1);
        assert_eq!(prompts[0][0].role, Role::User);
        assert_eq!(
            prompts[0][0].content,
            "Q: When was it founded?\nCTX: Pelotas was founded in 1812."
        );
    }

    #[tokio::test]
    async fn system_prompt_sent_when_enabled() {
        let mock = MockProvider::default();
        let f = fixture_with(mock.clone(), true).await;
        f.assistant.ask("q").await.unwrap();

        let prompts = mock.recorded_prompts();
        assert_eq!(prompts[0][0].role, Role::System);
        assert_eq!(prompts[0][0].content, "Answer briefly.");
        assert_eq!(prompts[0][1].content, "Q: q\nCTX: ");
    }

    #[tokio::test]
    async fn ask_with_empty_store_sends_empty_context() {
        let mock = MockProvider::default();
        let f = fixture(mock.clone()).await;

        let answer = f.assistant.ask("Anything?").await.unwrap();
        assert_eq!(answer, "mock response");
        assert_eq!(mock.recorded_prompts()[0][0].content, "Q: Anything?\nCTX: ");
    }

    #[tokio::test]
    async fn ask_reports_missing_template() {
        let f = fixture(MockProvider::default()).await;
        std::fs::remove_file(&f.assistant.settings().template_path).unwrap();
        let err = f.assistant.ask("q").await.unwrap_err();
        assert!(matches!(err, AssistantError::Prompt(PromptError::Io { .. })));
    }

    #[tokio::test]
    async fn ask_propagates_embedding_failure() {
        let f = fixture(MockProvider::failing()).await;
        let err = f.assistant.ask("q").await.unwrap_err();
        assert!(matches!(err, AssistantError::Llm(_)));
    }

    #[tokio::test]
    async fn ingest_twice_skips_known_documents() {
        let f = fixture(MockProvider::default()).await;
        std::fs::write(f.data.join("a.txt"), "First. Second.").unwrap();

        let first = f.assistant.ingest().await.unwrap();
        assert_eq!(first.processed, vec!["a"]);

        let second = f.assistant.ingest().await.unwrap();
        assert_eq!(second.skipped, vec!["a"]);
        assert_eq!(
            second.status_message("Processed:", "Nothing new."),
            "Nothing new."
        );
    }

    #[tokio::test]
    async fn concurrent_ingestions_are_serialized() {
        let mock = MockProvider::default();
        let f = fixture(mock.clone()).await;
        std::fs::write(f.data.join("a.txt"), "One. Two. Three.").unwrap();

        let (r1, r2) = tokio::join!(f.assistant.ingest(), f.assistant.ingest());
        let (r1, r2) = (r1.unwrap(), r2.unwrap());
        assert_eq!(r1.processed.len() + r2.processed.len(), 1);
        assert_eq!(r1.skipped.len() + r2.skipped.len(), 1);
        assert_eq!(mock.embed_calls(), 1);
    }

    #[tokio::test]
    async fn ingest_missing_folder_is_document_error() {
        let f = fixture(MockProvider::default()).await;
        let err = f
            .assistant
            .ingest_folder(Path::new("/nonexistent/pelot-data"))
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::Document(DocumentError::Io(_))));
    }
}
