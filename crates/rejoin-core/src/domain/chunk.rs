//! The unit produced by one fetch task.

use bytes::Bytes;

/// Bytes of one chunk, tagged with the index it was fetched for.
///
/// Produced by exactly one fetch task and consumed once by the joiner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkResult {
    pub index: u32,
    pub bytes: Bytes,
}

impl ChunkResult {
    pub fn new(index: u32, bytes: impl Into<Bytes>) -> Self {
        Self {
            index,
            bytes: bytes.into(),
        }
    }
}
