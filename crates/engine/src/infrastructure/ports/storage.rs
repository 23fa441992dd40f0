//! Storage port for uploaded documents.

use async_trait::async_trait;

use super::error::StorageError;

/// A file already written to storage by the upload handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Absolute path of the stored copy.
    pub path: String,
    /// Name the client gave the file.
    pub original_name: String,
    pub size: u64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn exists(&self, path: &str) -> bool;

    /// Delete a stored file. Deleting a missing file is not an error.
    async fn remove(&self, path: &str) -> Result<(), StorageError>;
}
