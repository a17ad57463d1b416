//! ResponseGate - response をちょうど 1 回だけ送るための関門
//!
//! 送信側は `Option<oneshot::Sender>` を 1 つ持つだけで、`send` で `take()` した
//! 最初の呼び出しだけが実際に送ります。2 回目以降は何もせず `false` を返します。

use std::sync::Mutex;

use tokio::sync::oneshot;

use crate::domain::ResponseEnvelope;

pub struct ResponseGate {
    sender: Mutex<Option<oneshot::Sender<ResponseEnvelope>>>,
}

impl ResponseGate {
    /// Create a gate and the receiver that observes its single response.
    pub fn channel() -> (Self, oneshot::Receiver<ResponseEnvelope>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                sender: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    /// Send `envelope` if nothing has been sent yet.
    ///
    /// Returns `true` only for the call that won the gate. A dropped receiver
    /// still closes the gate.
    pub fn send(&self, envelope: ResponseEnvelope) -> bool {
        let sender = {
            let mut guard = self.sender.lock().unwrap_or_else(|p| p.into_inner());
            guard.take()
        };
        match sender {
            Some(tx) => {
                if tx.send(envelope).is_err() {
                    tracing::debug!("response receiver dropped before send");
                }
                true
            }
            None => {
                tracing::warn!("response already sent; dropping second envelope");
                false
            }
        }
    }

    pub fn is_sent(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .is_none()
    }
}
