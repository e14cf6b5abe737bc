use std::path::{Path, PathBuf};
use std::sync::Arc;

use pelot_llm::provider::EmbedFuture;

use super::loader::document_name;
use super::types::chunk_key;
use super::{
    Chunk, ChunkManifest, Document, DocumentError, DocumentLoader, PdfLoader, TextSplitter,
};
use crate::vector_store::{ChunkRecord, VectorStore};

pub type EmbedFn = Box<dyn Fn(&str) -> EmbedFuture + Send + Sync>;

/// Outcome of one folder ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents chunked and stored during this run, in processing order.
    pub processed: Vec<String>,
    /// Documents whose first chunk was already present in the store.
    pub skipped: Vec<String>,
    pub chunks_written: usize,
}

impl IngestReport {
    /// `processed_prefix` followed by the comma-separated processed names, or
    /// `nothing_new` when this run stored no document.
    #[must_use]
    pub fn status_message(&self, processed_prefix: &str, nothing_new: &str) -> String {
        if self.processed.is_empty() {
            nothing_new.to_owned()
        } else {
            format!("{processed_prefix} {}", self.processed.join(", "))
        }
    }
}

pub struct IngestionPipeline {
    splitter: TextSplitter,
    store: Arc<dyn VectorStore>,
    collection: String,
    embed_fn: EmbedFn,
    loaders: Vec<Box<dyn DocumentLoader>>,
    chunks_file: PathBuf,
}

impl IngestionPipeline {
    /// Pipeline with the PDF loader registered and `chunks.json` as side file.
    pub fn new(
        splitter: TextSplitter,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
        embed_fn: EmbedFn,
    ) -> Self {
        Self {
            splitter,
            store,
            collection: collection.into(),
            embed_fn,
            loaders: vec![Box::new(PdfLoader::default())],
            chunks_file: PathBuf::from("chunks.json"),
        }
    }

    /// Replace the registered loaders.
    #[must_use]
    pub fn with_loaders(mut self, loaders: Vec<Box<dyn DocumentLoader>>) -> Self {
        self.loaders = loaders;
        self
    }

    #[must_use]
    pub fn with_chunks_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.chunks_file = path.into();
        self
    }

    #[must_use]
    pub fn chunks_file(&self) -> &Path {
        &self.chunks_file
    }

    /// Whether chunk 0 of `document_name` is already stored.
    ///
    /// Only the first chunk is probed; a document interrupted after chunk 0 counts
    /// as fully indexed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lookup fails.
    pub async fn is_indexed(&self, document_name: &str) -> Result<bool, DocumentError> {
        let probe = chunk_key(document_name, 0);
        let found = self.store.get(&self.collection, vec![probe]).await?;
        Ok(!found.is_empty())
    }

    /// Split, embed, and store a document one chunk at a time. Returns the chunks written.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding or storage fails.
    pub async fn ingest(&self, document: &Document) -> Result<Vec<Chunk>, DocumentError> {
        let chunks = self.splitter.split(document);
        for chunk in &chunks {
            let embedding = (self.embed_fn)(&chunk.content).await?;
            let record = ChunkRecord {
                id: chunk.key(),
                document: chunk.content.clone(),
                metadata: chunk.metadata(),
                embedding,
            };
            self.store.add(&self.collection, record).await?;
        }
        Ok(chunks)
    }

    /// Ingest every recognized, not yet indexed file in `folder`, then overwrite the
    /// side file with the chunks written during this run.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be read, or loading, embedding,
    /// storage, or the side file write fails.
    pub async fn ingest_folder(&self, folder: &Path) -> Result<IngestReport, DocumentError> {
        let files = self.candidate_files(folder).await?;
        let mut report = IngestReport::default();
        let mut manifest = ChunkManifest::new();

        for (path, loader) in files {
            let name = document_name(&path);
            if self.is_indexed(&name).await? {
                tracing::info!(document = %name, "already indexed, skipping");
                report.skipped.push(name);
                continue;
            }

            tracing::info!(document = %name, path = %path.display(), "ingesting");
            let document = loader.load(&path).await?;
            let chunks = self.ingest(&document).await?;
            tracing::info!(document = %name, chunks = chunks.len(), "stored chunks");

            report.chunks_written += chunks.len();
            manifest.insert(
                name.clone(),
                chunks.into_iter().map(|c| c.content).collect(),
            );
            report.processed.push(name);
        }

        manifest.write(&self.chunks_file).await?;
        Ok(report)
    }

    async fn candidate_files(
        &self,
        folder: &Path,
    ) -> Result<Vec<(PathBuf, &dyn DocumentLoader)>, DocumentError> {
        let mut entries = tokio::fs::read_dir(folder).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();

        Ok(paths
            .into_iter()
            .filter_map(|path| {
                let loader = self.loaders.iter().find(|l| l.accepts(&path))?;
                Some((path, loader.as_ref()))
            })
            .collect())
    }
}
