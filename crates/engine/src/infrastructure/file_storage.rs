//! Local disk storage for uploaded regulation documents.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::infrastructure::ports::{ClockPort, FileStorage, StorageError, UploadedFile};

/// Stores uploads under `<uploads_dir>/regulations` with random names.
pub struct LocalFileStorage {
    dir: PathBuf,
    max_bytes: u64,
    clock: Arc<dyn ClockPort>,
}

impl LocalFileStorage {
    /// Create the target directory if needed. Stored paths are absolute.
    pub async fn new(
        uploads_dir: &Path,
        max_bytes: u64,
        clock: Arc<dyn ClockPort>,
    ) -> Result<Self, StorageError> {
        let dir = uploads_dir.join("regulations");
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::io("create_dir", e))?;
        let dir = tokio::fs::canonicalize(&dir)
            .await
            .map_err(|e| StorageError::io("canonicalize", e))?;

        tracing::info!(dir = %dir.display(), max_bytes, "Upload storage ready");
        Ok(Self {
            dir,
            max_bytes,
            clock,
        })
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Open a new file for an incoming upload.
    pub async fn begin_upload(&self, original_name: &str) -> Result<UploadSink, StorageError> {
        let path = self
            .dir
            .join(stored_name(original_name, self.clock.now().timestamp_millis()));
        let file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| StorageError::io("create_file", e))?;

        Ok(UploadSink {
            file,
            path,
            original_name: original_name.to_string(),
            written: 0,
            limit: self.max_bytes,
        })
    }
}

/// `<32 hex chars>-<unix millis><original extension>`
fn stored_name(original_name: &str, millis: i64) -> String {
    let random: [u8; 16] = rand::random();
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    format!("{}-{}{}", hex::encode(random), millis, extension)
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn exists(&self, path: &str) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn remove(&self, path: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(path, "Removed stored file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io("remove_file", e)),
        }
    }
}

/// An upload being written to disk.
pub struct UploadSink {
    file: tokio::fs::File,
    path: PathBuf,
    original_name: String,
    written: u64,
    limit: u64,
}

impl UploadSink {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a chunk. Fails once the total passes the size limit.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), StorageError> {
        self.written += chunk.len() as u64;
        if self.written > self.limit {
            return Err(StorageError::TooLarge { limit: self.limit });
        }
        self.file
            .write_all(chunk)
            .await
            .map_err(|e| StorageError::io("write_chunk", e))
    }

    pub async fn finish(mut self) -> Result<UploadedFile, StorageError> {
        self.file
            .flush()
            .await
            .map_err(|e| StorageError::io("flush", e))?;

        Ok(UploadedFile {
            path: self.path.to_string_lossy().into_owned(),
            original_name: self.original_name,
            size: self.written,
        })
    }

    /// Close and delete the partial file.
    pub async fn abort(self) {
        let Self { file, path, .. } = self;
        drop(file);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove aborted upload");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use chrono::{TimeZone, Utc};

    fn clock() -> Arc<dyn ClockPort> {
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).single().expect("time");
        Arc::new(FixedClock(at))
    }

    #[test]
    fn stored_name_keeps_extension() {
        let name = stored_name("Perdes No 1.pdf", 1_700_000_000_000);
        let (random, rest) = name.split_once('-').expect("separator");
        assert_eq!(random.len(), 32);
        assert!(random.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(rest, "1700000000000.pdf");

        assert!(stored_name("README", 5).ends_with("-5"));
    }

    #[tokio::test]
    async fn upload_is_written_under_regulations_dir() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let storage = LocalFileStorage::new(tmp.path(), 1024, clock()).await.expect("storage");

        let mut sink = storage.begin_upload("perdes.pdf").await.expect("begin");
        sink.write_chunk(b"%PDF-1.4 ").await.expect("chunk");
        sink.write_chunk(b"body").await.expect("chunk");
        let uploaded = sink.finish().await.expect("finish");

        assert_eq!(uploaded.original_name, "perdes.pdf");
        assert_eq!(uploaded.size, 13);
        assert!(Path::new(&uploaded.path).is_absolute());
        assert!(uploaded.path.contains("regulations"));
        assert!(uploaded.path.ends_with("-1700000000000.pdf"));
        assert!(storage.exists(&uploaded.path).await);
        let contents = tokio::fs::read(&uploaded.path).await.expect("read");
        assert_eq!(contents, b"%PDF-1.4 body");
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected_and_can_be_aborted() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let storage = LocalFileStorage::new(tmp.path(), 8, clock()).await.expect("storage");

        let mut sink = storage.begin_upload("big.pdf").await.expect("begin");
        let path = sink.path().to_string_lossy().into_owned();
        let err = sink.write_chunk(b"0123456789").await.expect_err("too large");
        assert!(matches!(err, StorageError::TooLarge { limit: 8 }));

        sink.abort().await;
        assert!(!storage.exists(&path).await);
    }

    #[tokio::test]
    async fn removing_a_missing_file_is_not_an_error() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let storage = LocalFileStorage::new(tmp.path(), 8, clock()).await.expect("storage");
        let missing = tmp.path().join("nope.pdf");

        storage
            .remove(&missing.to_string_lossy())
            .await
            .expect("remove missing");
    }
}
