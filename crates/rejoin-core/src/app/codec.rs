//! WireCodec - MessagePack の request / response 変換
//!
//! # デコードフロー
//! 1. body を `RequestWire` に rmp-serde でデシリアライズ
//! 2. `ReassemblyRequest::new` で検証
//! 3. どちらかが失敗したら `MalformedRequest`（store には一切触れない）

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ReassemblyRequest, RejoinError, ResponseEnvelope};

/// Content type of request and response bodies.
pub const CONTENT_TYPE: &str = "application/msgpack";

/// Raw request fields as they appear on the wire.
///
/// Absent fields decode to their defaults and are rejected by validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestWire {
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub how_many_chunks: i64,
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("msgpack encode failed: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("msgpack decode failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WireCodec;

impl WireCodec {
    /// Decode and validate a request body.
    pub fn decode_request(body: &[u8], max_chunks: u32) -> Result<ReassemblyRequest, RejoinError> {
        let wire: RequestWire = rmp_serde::from_slice(body)
            .map_err(|e| RejoinError::MalformedRequest(format!("undecodable body: {e}")))?;
        ReassemblyRequest::new(wire.hash, wire.how_many_chunks, max_chunks)
    }

    pub fn encode_request(identifier: &str, chunk_count: i64) -> Result<Vec<u8>, CodecError> {
        let wire = RequestWire {
            hash: identifier.to_string(),
            how_many_chunks: chunk_count,
        };
        Ok(rmp_serde::to_vec_named(&wire)?)
    }

    /// Responses are encoded as maps so field names survive on the wire.
    pub fn encode_response(envelope: &ResponseEnvelope) -> Result<Vec<u8>, CodecError> {
        Ok(rmp_serde::to_vec_named(envelope)?)
    }

    pub fn decode_response(body: &[u8]) -> Result<ResponseEnvelope, CodecError> {
        Ok(rmp_serde::from_slice(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Partial {
        hash: String,
    }

    #[derive(Serialize)]
    struct CountOnly {
        how_many_chunks: i64,
    }

    #[derive(Serialize)]
    struct WrongType {
        hash: String,
        how_many_chunks: String,
    }

    #[test]
    fn request_decodes_and_validates() {
        let body = WireCodec::encode_request("abc123", 2).unwrap();
        let request = WireCodec::decode_request(&body, 16).unwrap();
        assert_eq!(request.identifier(), "abc123");
        assert_eq!(request.chunk_count(), 2);
    }

    #[test]
    fn array_encoded_request_is_accepted() {
        let body = rmp_serde::to_vec(&RequestWire {
            hash: "abc".into(),
            how_many_chunks: 3,
        })
        .unwrap();
        let request = WireCodec::decode_request(&body, 16).unwrap();
        assert_eq!(request.chunk_count(), 3);
    }

    #[rstest]
    #[case::garbage(vec![0xc1, 0xff, 0x00])]
    #[case::empty(Vec::new())]
    #[case::missing_hash(rmp_serde::to_vec_named(&CountOnly { how_many_chunks: 2 }).unwrap())]
    #[case::missing_count(rmp_serde::to_vec_named(&Partial { hash: "abc".into() }).unwrap())]
    #[case::wrong_type(rmp_serde::to_vec_named(&WrongType {
        hash: "abc".into(),
        how_many_chunks: "three".into(),
    }).unwrap())]
    #[case::zero_count(WireCodec::encode_request("abc", 0).unwrap())]
    #[case::negative_count(WireCodec::encode_request("abc", -4).unwrap())]
    #[case::blank_identifier(WireCodec::encode_request("  ", 2).unwrap())]
    #[case::over_limit(WireCodec::encode_request("abc", 17).unwrap())]
    fn bad_requests_are_malformed(#[case] body: Vec<u8>) {
        let err = WireCodec::decode_request(&body, 16).unwrap_err();
        assert!(matches!(err, RejoinError::MalformedRequest(_)));
    }

    #[test]
    fn response_keeps_field_names() {
        let body = WireCodec::encode_response(&ResponseEnvelope::success("h")).unwrap();
        // fixmap(1) "hash" "h"
        assert_eq!(body[0], 0x81);
        assert_eq!(
            WireCodec::decode_response(&body).unwrap(),
            ResponseEnvelope::success("h")
        );

        let body = WireCodec::encode_response(&ResponseEnvelope::error("Failed to read chunk"))
            .unwrap();
        assert_eq!(
            WireCodec::decode_response(&body).unwrap(),
            ResponseEnvelope::error("Failed to read chunk")
        );
    }
}
