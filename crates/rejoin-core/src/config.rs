//! Deployment configuration.
//!
//! The bucket is fixed per deployment; nothing in here is taken from a request.

use std::path::PathBuf;

use thiserror::Error;

/// Default MIME classification written into the metadata sidecar.
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Upper bound on `how_many_chunks` accepted from a request.
pub const DEFAULT_MAX_CHUNKS: u32 = 65_536;

/// Slice size used when streaming the joined object into the store (8 MiB).
pub const DEFAULT_WRITE_CHUNK_SIZE: usize = 8 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("bucket name must not be empty")]
    EmptyBucket,

    #[error("bucket name must not contain path separators: {0}")]
    InvalidBucket(String),

    #[error("max_chunks must be greater than 0")]
    ZeroMaxChunks,

    #[error("write_chunk_size must be greater than 0")]
    ZeroWriteChunkSize,

    #[error("mime must not be empty")]
    EmptyMime,
}

/// Settings shared by every reassembly request served by one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejoinConfig {
    /// Bucket (namespace) all objects are read from and written to.
    pub bucket: String,

    /// Root directory for the filesystem store; the bucket lives below it.
    pub data_dir: PathBuf,

    /// Cap on in-flight chunk reads. `None` spawns one task per chunk.
    pub max_concurrent_fetches: Option<usize>,

    /// Largest chunk count a request may ask for.
    pub max_chunks: u32,

    /// Size of the slices handed to the store when writing the joined object.
    pub write_chunk_size: usize,

    /// MIME type recorded in the `.meta` sidecar.
    pub mime: String,
}

impl RejoinConfig {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    pub fn with_max_concurrent_fetches(mut self, limit: Option<usize>) -> Self {
        self.max_concurrent_fetches = limit;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Directory backing the configured bucket.
    pub fn bucket_dir(&self) -> PathBuf {
        self.data_dir.join(&self.bucket)
    }

    /// Fail-fast check run once at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket.is_empty() {
            return Err(ConfigError::EmptyBucket);
        }
        if self.bucket.contains(['/', '\\']) || self.bucket == "." || self.bucket == ".." {
            return Err(ConfigError::InvalidBucket(self.bucket.clone()));
        }
        if self.max_chunks == 0 {
            return Err(ConfigError::ZeroMaxChunks);
        }
        if self.write_chunk_size == 0 {
            return Err(ConfigError::ZeroWriteChunkSize);
        }
        if self.mime.trim().is_empty() {
            return Err(ConfigError::EmptyMime);
        }
        Ok(())
    }
}

impl Default for RejoinConfig {
    fn default() -> Self {
        Self {
            bucket: "rejoin".to_string(),
            data_dir: PathBuf::from("data"),
            max_concurrent_fetches: None,
            max_chunks: DEFAULT_MAX_CHUNKS,
            write_chunk_size: DEFAULT_WRITE_CHUNK_SIZE,
            mime: DEFAULT_MIME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_config_is_valid() {
        let config = RejoinConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.mime, "application/octet-stream");
        assert!(config.max_concurrent_fetches.is_none());
    }

    #[test]
    fn bucket_dir_is_below_data_dir() {
        let config = RejoinConfig::new("uploads").with_data_dir("/srv/rejoin");
        assert_eq!(config.bucket_dir(), PathBuf::from("/srv/rejoin/uploads"));
    }

    #[rstest]
    #[case::empty("", ConfigError::EmptyBucket)]
    #[case::slash("a/b", ConfigError::InvalidBucket("a/b".to_string()))]
    #[case::parent("..", ConfigError::InvalidBucket("..".to_string()))]
    fn rejects_bad_bucket(#[case] bucket: &str, #[case] expected: ConfigError) {
        let config = RejoinConfig::new(bucket);
        assert_eq!(config.validate(), Err(expected));
    }

    #[test]
    fn rejects_zero_limits() {
        let config = RejoinConfig {
            max_chunks: 0,
            ..RejoinConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxChunks));

        let config = RejoinConfig {
            write_chunk_size: 0,
            ..RejoinConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroWriteChunkSize));
    }
}
