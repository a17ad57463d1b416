//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! core が外部（blob storage）と話すのはここで定義した trait 越しだけです。

pub mod blob_store;

pub use self::blob_store::{BlobStore, ByteStream, ObjectSink, StoreError};
