#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file too large: {0} bytes")]
    FileTooLarge(u64),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("embedding failed: {0}")]
    Embedding(#[from] pelot_llm::LlmError),

    #[error("storage error: {0}")]
    Storage(#[from] crate::vector_store::VectorStoreError),

    #[error("chunk file error: {0}")]
    Json(#[from] serde_json::Error),
}
