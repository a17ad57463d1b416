//! Publisher - 結合済み object と `.meta` の書き込み
//!
//! # 書き込み順序
//! 1. `"<identifier>"` に結合済み bytes を `write_chunk_size` ずつ書き、`finish` で確定
//! 2. object が受理された後でだけ `"<identifier>.meta"` を書く
//!
//! object の書き込みが失敗した場合は sink を abort し、`.meta` は開きもしません。

use std::sync::Arc;

use tracing::instrument;

use crate::domain::{JoinedArtifact, MetaRecord, PublishStage, ReassemblyRequest, RejoinError};
use crate::ports::{BlobStore, ObjectSink, StoreError};

pub struct Publisher {
    store: Arc<dyn BlobStore>,
    mime: String,
    write_chunk_size: usize,
}

impl Publisher {
    pub fn new(store: Arc<dyn BlobStore>, mime: impl Into<String>, write_chunk_size: usize) -> Self {
        Self {
            store,
            mime: mime.into(),
            write_chunk_size: write_chunk_size.max(1),
        }
    }

    /// Write the joined object, then its metadata sidecar.
    #[instrument(skip_all, fields(identifier = %request.identifier(), size = artifact.size))]
    pub async fn publish(
        &self,
        request: &ReassemblyRequest,
        artifact: &JoinedArtifact,
    ) -> Result<MetaRecord, RejoinError> {
        let written = self
            .write_object(request.object_name(), artifact)
            .await
            .map_err(|e| RejoinError::publish(PublishStage::Object, e))?;
        tracing::debug!(bytes = written, "joined object accepted");

        let meta = MetaRecord::for_artifact(artifact, &self.mime);
        let json = meta
            .to_json()
            .map_err(|e| RejoinError::Internal(format!("meta serialization failed: {e}")))?;

        let meta_name = request.meta_name();
        let sink = self
            .store
            .open_write(&meta_name)
            .await
            .map_err(|e| RejoinError::publish(PublishStage::Meta, e))?;
        write_all(sink, [bytes::Bytes::from(json)])
            .await
            .map_err(|e| RejoinError::publish(PublishStage::Meta, e))?;
        tracing::debug!(name = %meta_name, "meta accepted");

        Ok(meta)
    }

    async fn write_object(&self, name: &str, artifact: &JoinedArtifact) -> Result<u64, StoreError> {
        let sink = self.store.open_write(name).await?;
        let bytes = &artifact.bytes;
        let slices = (0..bytes.len())
            .step_by(self.write_chunk_size)
            .map(|start| bytes.slice(start..(start + self.write_chunk_size).min(bytes.len())));
        write_all(sink, slices).await
    }
}

/// Feed every slice into `sink` and finish it, aborting on the first write error.
async fn write_all(
    mut sink: Box<dyn ObjectSink>,
    slices: impl IntoIterator<Item = bytes::Bytes>,
) -> Result<u64, StoreError> {
    for slice in slices {
        if let Err(e) = sink.write(slice).await {
            if let Err(abort_err) = sink.abort().await {
                tracing::warn!(error = %abort_err, "failed to abort sink");
            }
            return Err(e);
        }
    }
    sink.finish().await
}
