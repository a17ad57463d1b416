//! Joined artifact and its metadata sidecar.
//!
//! The artifact only lives between hashing and publishing; the sidecar is the
//! JSON record stored next to it as `"<identifier>.meta"`.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Joined bytes together with their content identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedArtifact {
    pub bytes: Bytes,
    pub size: u64,
    pub hash: String,
}

/// Metadata record written after the joined object is accepted by the store.
///
/// Field order is part of the stored format: `hash`, `size`, `mime`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaRecord {
    pub hash: String,
    pub size: u64,
    pub mime: String,
}

impl MetaRecord {
    pub fn for_artifact(artifact: &JoinedArtifact, mime: impl Into<String>) -> Self {
        Self {
            hash: artifact.hash.clone(),
            size: artifact.size,
            mime: mime.into(),
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
