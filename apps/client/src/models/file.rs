use std::path::Path;

use anyhow::{Context, Result};
use bytes::Bytes;

/// Extensions offered by the file picker. Advisory only: the analyzer decides
/// what it accepts.
pub const SUGGESTED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt"];

/// Accept string in the form a file-input element expects.
pub const ACCEPT_HINT: &str = ".pdf,.doc,.docx,.txt";

/// Label shown next to an empty picker.
pub const FORMAT_HINT: &str = "PDF, DOC, DOCX, or TXT format";

/// The resume chosen by the user. Cloning is cheap: the content is a shared `Bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Reads a file from disk, keeping only its final path component as the name.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read resume file '{}'", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("'{}' does not name a file", path.display()))?;
        Ok(Self::new(name, content))
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Size in kibibytes with one decimal, e.g. `120.0 KB`.
    pub fn size_label(&self) -> String {
        format!("{:.1} KB", self.size() as f64 / 1024.0)
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    pub fn has_suggested_extension(&self) -> bool {
        self.extension()
            .is_some_and(|ext| SUGGESTED_EXTENSIONS.contains(&ext.as_str()))
    }
}
