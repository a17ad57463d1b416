//! Reassembly request and the chunk names derived from it.

use std::fmt;

use super::errors::RejoinError;

/// A validated request to join `chunk_count` chunks stored under `identifier`.
///
/// `identifier` is both the prefix of the chunk objects and the name of the
/// joined object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassemblyRequest {
    identifier: String,
    chunk_count: u32,
}

impl ReassemblyRequest {
    /// Validate raw request values. Nothing touches the store before this succeeds.
    pub fn new(
        identifier: impl Into<String>,
        chunk_count: i64,
        max_chunks: u32,
    ) -> Result<Self, RejoinError> {
        let identifier = identifier.into();
        if identifier.trim().is_empty() {
            return Err(RejoinError::MalformedRequest(
                "identifier must not be empty".to_string(),
            ));
        }
        if chunk_count <= 0 {
            return Err(RejoinError::MalformedRequest(format!(
                "chunk count must be positive, got {chunk_count}"
            )));
        }
        if chunk_count > i64::from(max_chunks) {
            return Err(RejoinError::MalformedRequest(format!(
                "chunk count {chunk_count} exceeds limit {max_chunks}"
            )));
        }
        Ok(Self {
            identifier,
            chunk_count: chunk_count as u32,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn chunk_count(&self) -> u32 {
        self.chunk_count
    }

    /// Name of the joined object.
    pub fn object_name(&self) -> &str {
        &self.identifier
    }

    /// Name of the metadata sidecar.
    pub fn meta_name(&self) -> String {
        format!("{}.meta", self.identifier)
    }

    /// Chunk references in ascending index order.
    pub fn chunk_refs(&self) -> impl Iterator<Item = ChunkRef> + '_ {
        (0..self.chunk_count).map(|index| ChunkRef::new(&self.identifier, index))
    }
}

/// One chunk object, `"<identifier>.<index>"`. Computed, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRef {
    pub index: u32,
    pub object_name: String,
}

impl ChunkRef {
    pub fn new(identifier: &str, index: u32) -> Self {
        Self {
            index,
            object_name: format!("{identifier}.{index}"),
        }
    }
}

impl fmt::Display for ChunkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.object_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn derives_chunk_and_output_names() {
        let req = ReassemblyRequest::new("abc123", 3, 10).unwrap();

        let names: Vec<String> = req.chunk_refs().map(|c| c.object_name).collect();
        assert_eq!(names, vec!["abc123.0", "abc123.1", "abc123.2"]);
        assert_eq!(req.object_name(), "abc123");
        assert_eq!(req.meta_name(), "abc123.meta");
    }

    #[rstest]
    #[case::zero_chunks("abc", 0)]
    #[case::negative_chunks("abc", -4)]
    #[case::empty_identifier("", 2)]
    #[case::blank_identifier("   ", 2)]
    #[case::over_limit("abc", 11)]
    fn rejects_malformed_values(#[case] identifier: &str, #[case] chunks: i64) {
        let err = ReassemblyRequest::new(identifier, chunks, 10).unwrap_err();
        assert!(matches!(err, RejoinError::MalformedRequest(_)));
    }

    #[test]
    fn accepts_count_at_limit() {
        let req = ReassemblyRequest::new("abc", 10, 10).unwrap();
        assert_eq!(req.chunk_count(), 10);
        assert_eq!(req.chunk_refs().count(), 10);
    }
}
