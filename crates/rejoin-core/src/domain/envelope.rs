//! ResponseEnvelope - 呼び出し側へ返す唯一の response
//!
//! 1 リクエストにつき `Success` か `Error` のどちらか 1 つだけが作られます。

use serde::{Deserialize, Serialize};

use super::errors::RejoinError;

/// Wire shape is either `{ "hash": ... }` or `{ "message": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    Success { hash: String },
    Error { message: String },
}

impl ResponseEnvelope {
    pub fn success(hash: impl Into<String>) -> Self {
        Self::Success { hash: hash.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<&RejoinError> for ResponseEnvelope {
    fn from(err: &RejoinError) -> Self {
        Self::error(err.public_message())
    }
}
