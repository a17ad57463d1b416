//! Route configuration and handlers.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use bytes::Bytes;
use rejoin_core::app::{CONTENT_TYPE, WireCodec};
use rejoin_core::{Coordinator, Reply, ReplyStatus};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn router(coordinator: Arc<Coordinator>) -> Router {
    Router::new()
        .route("/join", post(join))
        // Liveness probe
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(coordinator)
}

async fn join(State(coordinator): State<Arc<Coordinator>>, body: Bytes) -> Response {
    let reply = coordinator.respond(&body).await;
    reply_response(&reply)
}

async fn health() -> &'static str {
    "ok"
}

fn reply_response(reply: &Reply) -> Response {
    let status = match reply.status {
        ReplyStatus::Ok => StatusCode::OK,
        ReplyStatus::ClientError => StatusCode::BAD_REQUEST,
    };
    match WireCodec::encode_response(&reply.envelope) {
        Ok(body) => (status, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode response",
            )
                .into_response()
        }
    }
}
