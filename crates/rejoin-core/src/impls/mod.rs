//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryBlobStore**: 開発用・テスト用（遅延・失敗の注入ができる）
//! - **FsBlobStore**: ローカルディレクトリを bucket とみなす実装
//!
//! # 本番用実装
//! S3 / GCS などのクライアントは `BlobStore` を実装した別クレートに置く想定です。

pub mod fs_store;
pub mod memory_store;

pub use self::fs_store::FsBlobStore;
pub use self::memory_store::InMemoryBlobStore;
