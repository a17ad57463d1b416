//! Local filesystem blob store.
//!
//! One directory per bucket, one file per object. Writes land in a
//! uniquely-named temp file and are renamed into place on `finish`, so a
//! reader never sees a half-written object.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::instrument;
use uuid::Uuid;

use crate::ports::{BlobStore, ByteStream, ObjectSink, StoreError};

/// Read buffer size for streaming reads (64 KiB).
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Filesystem-backed store rooted at a bucket directory.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create the bucket directory if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Object names are flat: no separators, no traversal, no hidden temp names.
    fn object_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.starts_with(".tmp.")
            || name.contains(['/', '\\', '\0'])
        {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

async fn read_piece(mut file: fs::File) -> Result<Option<(Bytes, fs::File)>, StoreError> {
    let mut buf = vec![0u8; STREAM_CHUNK_SIZE];
    let n = file.read(&mut buf).await?;
    if n == 0 {
        return Ok(None);
    }
    buf.truncate(n);
    Ok(Some((Bytes::from(buf), file)))
}

#[async_trait]
impl BlobStore for FsBlobStore {
    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn open_read(&self, name: &str) -> Result<ByteStream, StoreError> {
        let path = self.object_path(name)?;
        let file = fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(name.to_string())
            } else {
                StoreError::Io(e)
            }
        })?;

        Ok(Box::pin(stream::try_unfold(file, read_piece)))
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn open_write(&self, name: &str) -> Result<Box<dyn ObjectSink>, StoreError> {
        let final_path = self.object_path(name)?;
        // Unique temp name so concurrent writers of the same object never collide.
        let temp_path = self.root.join(format!(".tmp.{}.{}", name, Uuid::new_v4()));
        let file = fs::File::create(&temp_path).await?;

        Ok(Box::new(FsSink {
            file: Some(file),
            temp_path,
            final_path,
            bytes_written: 0,
            settled: false,
        }))
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}

/// Removes its temp file on drop unless `finish` or `abort` already settled it.
struct FsSink {
    file: Option<fs::File>,
    temp_path: PathBuf,
    final_path: PathBuf,
    bytes_written: u64,
    settled: bool,
}

#[async_trait]
impl ObjectSink for FsSink {
    async fn write(&mut self, data: Bytes) -> Result<(), StoreError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| StoreError::Backend("sink already closed".to_string()))?;
        file.write_all(&data).await?;
        self.bytes_written += data.len() as u64;
        Ok(())
    }

    async fn finish(mut self: Box<Self>) -> Result<u64, StoreError> {
        let file = self
            .file
            .take()
            .ok_or_else(|| StoreError::Backend("sink already closed".to_string()))?;
        // flush to disk before the rename makes the object visible
        file.sync_all().await?;
        drop(file);
        let renamed = fs::rename(&self.temp_path, &self.final_path).await;
        if renamed.is_err() {
            let _ = fs::remove_file(&self.temp_path).await;
        }
        self.settled = true;
        renamed?;
        Ok(self.bytes_written)
    }

    async fn abort(mut self: Box<Self>) -> Result<(), StoreError> {
        drop(self.file.take());
        let _ = fs::remove_file(&self.temp_path).await;
        self.settled = true;
        Ok(())
    }
}

impl Drop for FsSink {
    fn drop(&mut self) {
        if !self.settled {
            drop(self.file.take());
            if let Err(e) = std::fs::remove_file(&self.temp_path) {
                tracing::debug!(path = %self.temp_path.display(), error = %e, "temp file cleanup failed");
            }
        }
    }
}
