//! Content identity of the joined bytes.

use bytes::Bytes;

use crate::domain::JoinedArtifact;

/// Computes the content hash (MD5, lowercase hex) and size of joined bytes.
///
/// Pure: the same bytes always give the same identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentIdentity;

impl ContentIdentity {
    pub fn digest(bytes: &[u8]) -> String {
        let digest = md5::compute(bytes);
        hex::encode(digest.as_ref())
    }

    pub fn compute(bytes: Bytes) -> JoinedArtifact {
        let hash = Self::digest(&bytes);
        JoinedArtifact {
            size: bytes.len() as u64,
            hash,
            bytes,
        }
    }
}
