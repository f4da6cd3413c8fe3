use serde::{Deserialize, Serialize};

/// A single file descriptor parsed from the model's reply.
///
/// `path` is a slash-separated relative path; a leading separator is
/// tolerated and stripped during materialization. `content` is the literal
/// text written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Relative path of the file inside the generated application
    pub path: String,

    /// Complete text content of the file
    pub content: String,
}

impl GeneratedFile {
    /// Creates a new descriptor.
    #[must_use]
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Returns the content size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.content.len()
    }
}
