mod pdf;
mod text;

use std::path::Path;
use std::pin::Pin;

pub use pdf::PdfLoader;
pub use text::TextLoader;

use super::{Document, DocumentError};

pub trait DocumentLoader: Send + Sync {
    fn load(
        &self,
        path: &Path,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Document, DocumentError>> + Send + '_>>;

    fn supported_extensions(&self) -> &[&str];

    /// Exact, case-sensitive extension match against [`Self::supported_extensions`]:
    /// `report.pdf` is accepted, `REPORT.PDF` is not.
    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.supported_extensions()
                    .iter()
                    .any(|s| *s == ext)
            })
    }
}

/// Document name used for identity keys: the file name without its extension.
#[must_use]
pub fn document_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Resolve `path` and reject it when larger than `max_size` bytes.
pub(crate) async fn checked_path(
    path: &Path,
    max_size: u64,
) -> Result<std::path::PathBuf, DocumentError> {
    let path = tokio::fs::canonicalize(path).await?;
    let meta = tokio::fs::metadata(&path).await?;
    if meta.len() > max_size {
        return Err(DocumentError::FileTooLarge(meta.len()));
    }
    Ok(path)
}
