//! ChunkFetcher - chunk の並行取得
//!
//! # 学習ポイント
//! - `JoinSet` で chunk ごとに 1 task を spawn し、完了を読むのは呼び出し側 1 箇所だけ
//! - `Semaphore` による同時取得数の上限（設定されている場合のみ）
//! - 最初の失敗で abort フラグを立て、残りの task の結果は捨てる
//!   （task が実際に止まるかどうかに正しさは依存しない）

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::BytesMut;
use futures::StreamExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::instrument;

use super::joiner::OrderedJoiner;
use crate::domain::{ChunkRef, ChunkResult, ReassemblyRequest, RejoinError};
use crate::ports::BlobStore;

/// Fans out one read task per chunk and feeds completed chunks into an [`OrderedJoiner`].
pub struct ChunkFetcher {
    store: Arc<dyn BlobStore>,
    max_concurrent: Option<usize>,
}

impl ChunkFetcher {
    /// `max_concurrent = None` runs every chunk read at once.
    pub fn new(store: Arc<dyn BlobStore>, max_concurrent: Option<usize>) -> Self {
        Self {
            store,
            max_concurrent: max_concurrent.map(|n| n.max(1)),
        }
    }

    /// Fetch every chunk of `request` and place each into `joiner`.
    ///
    /// Returns on the first failure; results that complete afterwards are discarded.
    #[instrument(skip_all, fields(identifier = %request.identifier(), chunks = request.chunk_count()))]
    pub async fn fetch_into(
        &self,
        request: &ReassemblyRequest,
        joiner: &mut OrderedJoiner,
    ) -> Result<(), RejoinError> {
        let abort = Arc::new(AtomicBool::new(false));
        let permits = self.max_concurrent.map(|n| Arc::new(Semaphore::new(n)));

        let mut tasks = JoinSet::new();
        for chunk in request.chunk_refs() {
            let store = Arc::clone(&self.store);
            let abort = Arc::clone(&abort);
            let permits = permits.clone();

            tasks.spawn(async move {
                let _permit = match permits {
                    Some(sem) => Some(sem.acquire_owned().await.map_err(|_| {
                        RejoinError::Internal("fetch semaphore closed".to_string())
                    })?),
                    None => None,
                };
                fetch_chunk(store.as_ref(), chunk, &abort).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let err = match joined {
                Ok(Ok(result)) => {
                    joiner.insert(result)?;
                    continue;
                }
                Ok(Err(err)) => err,
                // panicked task; its index is unknown here
                Err(join_err) => RejoinError::Internal(format!("fetch task failed: {join_err}")),
            };

            abort.store(true, Ordering::Release);
            tasks.abort_all();
            if let RejoinError::ChunkReadFailure { index, source } = &err {
                tracing::warn!(index, error = %source, "chunk read failed; abandoning remaining fetches");
            }
            return Err(err);
        }

        Ok(())
    }
}

async fn fetch_chunk(
    store: &dyn BlobStore,
    chunk: ChunkRef,
    abort: &AtomicBool,
) -> Result<ChunkResult, RejoinError> {
    let index = chunk.index;
    let mut stream = store
        .open_read(&chunk.object_name)
        .await
        .map_err(|e| RejoinError::chunk_read(index, e))?;

    let mut buf = BytesMut::new();
    while let Some(piece) = stream.next().await {
        if abort.load(Ordering::Acquire) {
            return Err(RejoinError::Internal(format!(
                "fetch of chunk {index} abandoned"
            )));
        }
        let piece = piece.map_err(|e| RejoinError::chunk_read(index, e))?;
        buf.extend_from_slice(&piece);
    }

    tracing::trace!(index, bytes = buf.len(), "chunk fetched");
    Ok(ChunkResult::new(index, buf.freeze()))
}
