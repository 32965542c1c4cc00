//! Document loading and validation

use std::path::Path;

use tracing::debug;

use crate::documents::Document;
use crate::errors::DocRagError;
use crate::errors::Result;

const ALLOWED_EXTENSIONS: &[&str] = &["txt", "md"];

/// Loader for plain-text document formats
pub struct DocumentLoader {
    max_file_size: u64,
}

impl DocumentLoader {
    #[must_use]
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Validate that a file can be processed
    ///
    /// # Errors
    /// - File missing
    /// - File over the size limit
    /// - Unsupported extension
    pub fn validate(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(DocRagError::Document(format!(
                "File not found: {}",
                path.display()
            )));
        }

        let size = std::fs::metadata(path)?.len();
        if size > self.max_file_size {
            return Err(DocRagError::FileTooLarge {
                size,
                limit: self.max_file_size,
            });
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(DocRagError::UnsupportedFileType(extension));
        }

        Ok(())
    }

    /// Load a document from disk
    ///
    /// # Errors
    /// - Validation errors (missing file, size, extension)
    /// - Read errors
    /// - Empty file content
    pub fn load(&self, path: &Path) -> Result<Document> {
        self.validate(path)?;

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Err(DocRagError::Document(format!(
                "Document is empty: {}",
                path.display()
            )));
        }

        let source = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        let title = path
            .file_stem()
            .and_then(|n| n.to_str())
            .map(str::to_string);

        debug!("Loaded {} ({} chars)", source, content.chars().count());

        let mut document = Document::new(content, source);
        document.title = title;
        Ok(document)
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new(10 * 1024 * 1024)
    }
}
