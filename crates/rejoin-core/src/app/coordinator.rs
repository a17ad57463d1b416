//! Coordinator - 1 リクエストのパイプライン全体
//!
//! # 実行フロー
//! 1. body を decode・検証（失敗したら store には触れない）
//! 2. `ChunkFetcher` で全 chunk を並行取得し `OrderedJoiner` に格納
//! 3. 全 chunk が揃ったら連結し、`ContentIdentity` で hash と size を計算
//! 4. `Publisher` で object → `.meta` の順に書き込み
//! 5. 成功・失敗どちらの経路も `ResponseGate` を通して response を 1 回だけ返す

use std::sync::Arc;

use tracing::instrument;

use super::codec::WireCodec;
use super::fetcher::ChunkFetcher;
use super::gate::ResponseGate;
use super::identity::ContentIdentity;
use super::joiner::OrderedJoiner;
use super::publisher::Publisher;
use crate::config::RejoinConfig;
use crate::domain::{
    Completion, MetaRecord, ReassemblyRequest, ReassemblyState, RejoinError, ResponseEnvelope,
    StateTracker,
};
use crate::ports::BlobStore;

/// Transport-neutral outcome class of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    Ok,
    ClientError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: ReplyStatus,
    pub envelope: ResponseEnvelope,
}

impl From<ResponseEnvelope> for Reply {
    fn from(envelope: ResponseEnvelope) -> Self {
        let status = if envelope.is_success() {
            ReplyStatus::Ok
        } else {
            ReplyStatus::ClientError
        };
        Self { status, envelope }
    }
}

/// Drives one reassembly request from raw body to response.
///
/// Holds no per-request state; one instance serves any number of concurrent
/// requests.
pub struct Coordinator {
    store: Arc<dyn BlobStore>,
    config: RejoinConfig,
}

impl Coordinator {
    pub fn new(store: Arc<dyn BlobStore>, config: RejoinConfig) -> Self {
        Self { store, config }
    }

    /// Run the pipeline and return its single reply.
    pub async fn respond(&self, body: &[u8]) -> Reply {
        let (gate, rx) = ResponseGate::channel();
        self.handle(body, &gate).await;
        match rx.await {
            Ok(envelope) => envelope.into(),
            // handle always sends; reaching this means the gate was bypassed
            Err(_) => ResponseEnvelope::error("Failed to join chunks").into(),
        }
    }

    /// Run the pipeline and answer through `gate`.
    #[instrument(skip_all, fields(backend = self.store.backend_name(), bytes = body.len()))]
    pub async fn handle(&self, body: &[u8], gate: &ResponseGate) {
        let mut state = StateTracker::new();
        let outcome = match WireCodec::decode_request(body, self.config.max_chunks) {
            Ok(request) => self.pipeline(&request, &mut state).await,
            Err(err) => Err(err),
        };

        let (completion, envelope) = match outcome {
            Ok(meta) => {
                tracing::info!(hash = %meta.hash, size = meta.size, "reassembly complete");
                (Completion::Success, ResponseEnvelope::success(meta.hash))
            }
            Err(err) => {
                tracing::warn!(error = %err, stage = %state.current(), "reassembly failed");
                (Completion::Failure, ResponseEnvelope::from(&err))
            }
        };

        if let Err(err) = state.advance(ReassemblyState::Responded(completion)) {
            tracing::error!(error = %err, "unexpected terminal transition");
        }
        gate.send(envelope);
    }

    /// Fetch, join, hash and publish a validated request.
    pub async fn reassemble(&self, request: &ReassemblyRequest) -> Result<MetaRecord, RejoinError> {
        let mut state = StateTracker::new();
        self.pipeline(request, &mut state).await
    }

    #[instrument(skip_all, fields(identifier = %request.identifier(), chunks = request.chunk_count()))]
    async fn pipeline(
        &self,
        request: &ReassemblyRequest,
        state: &mut StateTracker,
    ) -> Result<MetaRecord, RejoinError> {
        state.advance(ReassemblyState::Fetching)?;
        let fetcher = ChunkFetcher::new(
            Arc::clone(&self.store),
            self.config.max_concurrent_fetches,
        );
        let mut joiner = OrderedJoiner::new(request.chunk_count());
        fetcher.fetch_into(request, &mut joiner).await?;

        state.advance(ReassemblyState::Joining)?;
        let joined = joiner.finish()?;

        state.advance(ReassemblyState::Hashing)?;
        let artifact = ContentIdentity::compute(joined);
        tracing::debug!(hash = %artifact.hash, size = artifact.size, "content identity computed");

        state.advance(ReassemblyState::Publishing)?;
        let publisher = Publisher::new(
            Arc::clone(&self.store),
            self.config.mime.clone(),
            self.config.write_chunk_size,
        );
        publisher.publish(request, &artifact).await
    }
}
