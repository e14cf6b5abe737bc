use std::path::Path;
use std::pin::Pin;

use super::super::{DEFAULT_MAX_FILE_SIZE, Document, DocumentError, DocumentMetadata};
use super::{DocumentLoader, checked_path, document_name};

/// Extracts the text layer of a PDF with every line break removed.
pub struct PdfLoader {
    pub max_file_size: u64,
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for PdfLoader {
    fn load(
        &self,
        path: &Path,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Document, DocumentError>> + Send + '_>>
    {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let path = checked_path(&path, max_size).await?;

            let source = path.display().to_string();
            let name = document_name(&path);
            let path_buf = path.clone();
            let raw = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text(&path_buf).map_err(|e| DocumentError::Pdf(e.to_string()))
            })
            .await
            .map_err(|e| DocumentError::Io(std::io::Error::other(e)))??;

            tracing::debug!(document = %name, chars = raw.len(), "extracted pdf text");

            Ok(Document {
                content: strip_newlines(&raw),
                metadata: DocumentMetadata {
                    source,
                    content_type: "application/pdf".to_owned(),
                    name,
                },
            })
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }
}

fn strip_newlines(text: &str) -> String {
    text.replace('\n', "")
}
