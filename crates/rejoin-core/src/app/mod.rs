//! App - パイプラインの各段階と、それを束ねる Coordinator
//!
//! # 構成
//! - **fetcher**: chunk の並行取得（JoinSet + 任意の同時数上限）
//! - **joiner**: index 順の結合
//! - **identity**: MD5 hash と size
//! - **publisher**: object → `.meta` の書き込み
//! - **gate**: response を 1 回だけ送る
//! - **codec**: MessagePack の request / response
//! - **coordinator**: 上記を 1 リクエスト分つなぐ

pub mod codec;
pub mod coordinator;
pub mod fetcher;
pub mod gate;
pub mod identity;
pub mod joiner;
pub mod publisher;

pub use codec::{CodecError, RequestWire, WireCodec, CONTENT_TYPE};
pub use coordinator::{Coordinator, Reply, ReplyStatus};
pub use fetcher::ChunkFetcher;
pub use gate::ResponseGate;
pub use identity::ContentIdentity;
pub use joiner::OrderedJoiner;
pub use publisher::Publisher;
