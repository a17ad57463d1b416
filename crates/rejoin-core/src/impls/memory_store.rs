//! InMemoryBlobStore - 開発用・テスト用の blob store
//!
//! # 学習ポイント
//! - `Arc<Mutex<HashMap>>` による共有状態（ロックを跨いで await しない）
//! - 読み込み遅延・失敗の注入（完了順序や部分失敗を再現するため）
//! - sink は `finish` まで map に触れない（書きかけの object は見えない）

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use tokio::sync::Mutex;

use crate::ports::{BlobStore, ByteStream, ObjectSink, StoreError};

/// Default size of the pieces a read stream yields.
const READ_PIECE_SIZE: usize = 64 * 1024;

#[derive(Default)]
struct MemoryState {
    objects: HashMap<String, Bytes>,
    read_delays: HashMap<String, Duration>,
    failing_reads: HashSet<String>,
    failing_writes: HashSet<String>,
    /// Names in the order their writes were finished.
    finished_writes: Vec<String>,
    /// Names in the order their sinks were opened.
    opened_writes: Vec<String>,
}

/// InMemoryBlobStore は HashMap に object を保持する
///
/// # 使用例
/// ```ignore
/// let store = InMemoryBlobStore::new();
/// store.insert("abc.0", "foo").await;
/// store.delay_read("abc.0", Duration::from_millis(30)).await;
/// store.fail_read("abc.1").await;
/// ```
#[derive(Clone)]
pub struct InMemoryBlobStore {
    state: Arc<Mutex<MemoryState>>,
    piece_size: usize,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            piece_size: READ_PIECE_SIZE,
        }
    }

    /// Split reads into pieces of `piece_size` bytes (minimum 1).
    pub fn with_piece_size(mut self, piece_size: usize) -> Self {
        self.piece_size = piece_size.max(1);
        self
    }

    pub async fn insert(&self, name: impl Into<String>, bytes: impl Into<Bytes>) {
        let mut state = self.state.lock().await;
        state.objects.insert(name.into(), bytes.into());
    }

    pub async fn get(&self, name: &str) -> Option<Bytes> {
        self.state.lock().await.objects.get(name).cloned()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.state.lock().await.objects.contains_key(name)
    }

    /// Delay every read of `name` by `delay` before the first byte.
    pub async fn delay_read(&self, name: impl Into<String>, delay: Duration) {
        self.state.lock().await.read_delays.insert(name.into(), delay);
    }

    /// Make reads of `name` fail after opening.
    pub async fn fail_read(&self, name: impl Into<String>) {
        self.state.lock().await.failing_reads.insert(name.into());
    }

    /// Make writes to `name` fail.
    pub async fn fail_write(&self, name: impl Into<String>) {
        self.state.lock().await.failing_writes.insert(name.into());
    }

    /// Object names in the order their writes completed.
    pub async fn finished_writes(&self) -> Vec<String> {
        self.state.lock().await.finished_writes.clone()
    }

    /// Object names in the order sinks were opened.
    pub async fn opened_writes(&self) -> Vec<String> {
        self.state.lock().await.opened_writes.clone()
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn open_read(&self, name: &str) -> Result<ByteStream, StoreError> {
        let (bytes, delay, failing) = {
            let state = self.state.lock().await;
            (
                state.objects.get(name).cloned(),
                state.read_delays.get(name).copied(),
                state.failing_reads.contains(name),
            )
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if failing {
            let err = StoreError::Backend(format!("injected read failure: {name}"));
            return Ok(Box::pin(stream::once(async move { Err(err) })));
        }

        let bytes = bytes.ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let pieces: Vec<Result<Bytes, StoreError>> = if bytes.is_empty() {
            Vec::new()
        } else {
            (0..bytes.len())
                .step_by(self.piece_size)
                .map(|start| {
                    let end = (start + self.piece_size).min(bytes.len());
                    Ok(bytes.slice(start..end))
                })
                .collect()
        };
        Ok(Box::pin(stream::iter(pieces)))
    }

    async fn open_write(&self, name: &str) -> Result<Box<dyn ObjectSink>, StoreError> {
        if name.is_empty() {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        let failing = {
            let mut state = self.state.lock().await;
            state.opened_writes.push(name.to_string());
            state.failing_writes.contains(name)
        };
        Ok(Box::new(MemorySink {
            name: name.to_string(),
            buffer: Vec::new(),
            failing,
            state: Arc::clone(&self.state),
        }))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

struct MemorySink {
    name: String,
    buffer: Vec<u8>,
    failing: bool,
    state: Arc<Mutex<MemoryState>>,
}

#[async_trait]
impl ObjectSink for MemorySink {
    async fn write(&mut self, data: Bytes) -> Result<(), StoreError> {
        if self.failing {
            return Err(StoreError::Backend(format!(
                "injected write failure: {}",
                self.name
            )));
        }
        self.buffer.extend_from_slice(&data);
        Ok(())
    }

    async fn finish(self: Box<Self>) -> Result<u64, StoreError> {
        let MemorySink {
            name,
            buffer,
            failing,
            state,
        } = *self;
        if failing {
            return Err(StoreError::Backend(format!(
                "injected write failure: {name}"
            )));
        }
        let len = buffer.len() as u64;
        let mut state = state.lock().await;
        state.objects.insert(name.clone(), Bytes::from(buffer));
        state.finished_writes.push(name);
        Ok(len)
    }

    async fn abort(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
