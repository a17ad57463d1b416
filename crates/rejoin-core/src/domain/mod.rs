//! Domain model (requests, chunks, artifacts, envelopes, state, errors).
//!
//! すべての型は 1 リクエストの実行中だけ存在し、リクエスト間で共有される状態はありません。
//! 永続化される状態は外部の blob store にのみ存在します。

pub mod artifact;
pub mod chunk;
pub mod envelope;
pub mod errors;
pub mod request;
pub mod state;

pub use artifact::{JoinedArtifact, MetaRecord};
pub use chunk::ChunkResult;
pub use envelope::ResponseEnvelope;
pub use errors::{JoinError, PublishStage, RejoinError};
pub use request::{ChunkRef, ReassemblyRequest};
pub use state::{Completion, InvalidTransition, ReassemblyState, StateTracker};
