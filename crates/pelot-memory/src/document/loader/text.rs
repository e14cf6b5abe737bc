use std::path::Path;
use std::pin::Pin;

use super::super::{DEFAULT_MAX_FILE_SIZE, Document, DocumentError, DocumentMetadata};
use super::{DocumentLoader, checked_path, document_name};

pub struct TextLoader {
    pub max_file_size: u64,
}

impl Default for TextLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for TextLoader {
    fn load(
        &self,
        path: &Path,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Document, DocumentError>> + Send + '_>>
    {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let path = checked_path(&path, max_size).await?;

            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            let content_type = match ext {
                "md" | "markdown" => "text/markdown",
                _ => "text/plain",
            };

            let content = tokio::fs::read_to_string(&path).await?;

            Ok(Document {
                content,
                metadata: DocumentMetadata {
                    source: path.display().to_string(),
                    content_type: content_type.to_owned(),
                    name: document_name(&path),
                },
            })
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt", "md", "markdown"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "hello world.").unwrap();

        let doc = TextLoader::default().load(&file).await.unwrap();
        assert_eq!(doc.content, "hello world.");
        assert_eq!(doc.metadata.content_type, "text/plain");
        assert_eq!(doc.metadata.name, "notes");
    }

    #[tokio::test]
    async fn load_markdown_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("readme.md");
        std::fs::write(&file, "# Title").unwrap();

        let doc = TextLoader::default().load(&file).await.unwrap();
        assert_eq!(doc.metadata.content_type, "text/markdown");
    }

    #[tokio::test]
    async fn load_nonexistent_file() {
        let result = TextLoader::default()
            .load(Path::new("/nonexistent/file.txt"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn metadata_source_is_canonical() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("test.txt");
        std::fs::write(&file, "data").unwrap();

        let doc = TextLoader::default().load(&file).await.unwrap();
        let canonical = std::fs::canonicalize(&file).unwrap();
        assert_eq!(doc.metadata.source, canonical.display().to_string());
    }

    #[tokio::test]
    async fn file_too_large_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("big.txt");
        std::fs::write(&file, "x").unwrap();

        let loader = TextLoader { max_file_size: 0 };
        let result = loader.load(&file).await;
        assert!(matches!(result, Err(DocumentError::FileTooLarge(_))));
    }
}
