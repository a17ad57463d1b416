//! Errors - エラー型と分類
//!
//! 内部エラーは段階の境界で `RejoinError` に変換され、
//! 呼び出し側には `public_message()` の短いメッセージだけが返ります。

use std::fmt;

use thiserror::Error;

use super::state::InvalidTransition;
use crate::ports::StoreError;

/// Which of the two publish writes failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStage {
    /// The joined object `"<identifier>"`.
    Object,
    /// The sidecar `"<identifier>.meta"`.
    Meta,
}

impl fmt::Display for PublishStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object => f.write_str("object"),
            Self::Meta => f.write_str("meta"),
        }
    }
}

/// Misuse of the ordered joiner. These indicate a bug in the fan-in, never bad input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinError {
    #[error("chunk index {index} out of range (chunk count {count})")]
    OutOfRange { index: u32, count: u32 },

    #[error("chunk index {0} delivered twice")]
    Duplicate(u32),

    #[error("chunk index {0} missing at join")]
    Missing(u32),
}

/// Every failure a reassembly request can end in.
#[derive(Debug, Error)]
pub enum RejoinError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("failed to read chunk {index}: {source}")]
    ChunkReadFailure {
        index: u32,
        #[source]
        source: StoreError,
    },

    #[error("failed to publish {stage}: {source}")]
    PublishFailure {
        stage: PublishStage,
        #[source]
        source: StoreError,
    },

    #[error("join failed: {0}")]
    Join(#[from] JoinError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl RejoinError {
    pub fn chunk_read(index: u32, source: StoreError) -> Self {
        Self::ChunkReadFailure { index, source }
    }

    pub fn publish(stage: PublishStage, source: StoreError) -> Self {
        Self::PublishFailure { stage, source }
    }

    /// Short caller-facing message. Never carries object names or indices.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MalformedRequest(_) => "Failed to parse request data",
            Self::ChunkReadFailure { .. } => "Failed to read chunk",
            Self::PublishFailure {
                stage: PublishStage::Object,
                ..
            } => "Failed to write joined content",
            Self::PublishFailure {
                stage: PublishStage::Meta,
                ..
            } => "Failed to write .meta content",
            Self::Join(_) | Self::Internal(_) => "Failed to join chunks",
        }
    }
}

impl From<InvalidTransition> for RejoinError {
    fn from(err: InvalidTransition) -> Self {
        Self::Internal(err.to_string())
    }
}
