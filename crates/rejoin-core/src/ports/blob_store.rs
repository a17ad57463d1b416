//! BlobStore port - Blob ストレージ（Local / InMemory / 将来は S3・GCS）
//!
//! パイプラインが store に要求するのは 2 つの操作だけです。
//! - `open_read(name)`: object を byte stream として読む
//! - `open_write(name)`: object を書き込む sink を開く（`finish` で確定）
//!
//! 接続管理やリトライは store 実装側の責務で、core からは見えません。

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use thiserror::Error;

/// A boxed stream of object bytes.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StoreError>> + Send>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("invalid object name: {0}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("backend error: {0}")]
    Backend(String),
}

/// BlobStore は 1 つの bucket に束縛された object store
///
/// # 設計原則
/// - bucket はデプロイ時に決まる（リクエストごとには変わらない）
/// - 書き込みは `ObjectSink::finish` が `Ok` を返した時点で「受理」とみなす
/// - `Send + Sync + 'static` を要求（fetch task から `Arc` 越しに共有する）
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Open an object for reading. A missing object yields `StoreError::NotFound`.
    async fn open_read(&self, name: &str) -> Result<ByteStream, StoreError>;

    /// Open a sink that creates or overwrites `name` once finished.
    async fn open_write(&self, name: &str) -> Result<Box<dyn ObjectSink>, StoreError>;

    /// Backend identifier for logs.
    fn backend_name(&self) -> &'static str;
}

/// Write side of an object. Nothing is observable until `finish` succeeds.
#[async_trait]
pub trait ObjectSink: Send {
    async fn write(&mut self, data: Bytes) -> Result<(), StoreError>;

    /// Publish the object and return the number of bytes written.
    async fn finish(self: Box<Self>) -> Result<u64, StoreError>;

    /// Drop everything written so far.
    async fn abort(self: Box<Self>) -> Result<(), StoreError>;
}
