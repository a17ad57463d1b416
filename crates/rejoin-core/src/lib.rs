//! rejoin-core
//!
//! Core building blocks for reassembling chunked blobs.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（request, chunk, artifact, envelope, state, errors）
//! - **ports**: 抽象化レイヤー（BlobStore, ObjectSink）
//! - **app**: アプリケーションロジック（fetcher, joiner, identity, publisher, gate, coordinator, codec）
//! - **impls**: 実装（InMemoryBlobStore, FsBlobStore）
//! - **config**: デプロイ時の設定（bucket, 同時取得数の上限など）
//!
//! # パイプライン
//! `Parsing → Fetching → Joining → Hashing → Publishing → Responded`
//!
//! 失敗はどの段階でも 1 つの error response に変換され、
//! 1 リクエストにつき response はちょうど 1 回だけ送られます。

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{Coordinator, Reply, ReplyStatus, ResponseGate};
pub use config::{ConfigError, RejoinConfig};
pub use domain::{ReassemblyRequest, RejoinError, ResponseEnvelope};
pub use ports::{BlobStore, StoreError};
