use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::{Deserialize, Serialize};

use whisper_api::ValidateResponse;
use whisper_engine::HandshakeError;

use super::{PublisherState, SubscriberState};
use crate::render;

/// Map a handshake failure onto an HTTP status with a JSON `{"error"}` body.
fn error_response(e: &HandshakeError) -> Response {
    let status = match e {
        HandshakeError::Decode(_) => StatusCode::BAD_REQUEST,
        HandshakeError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        HandshakeError::Config(_)
        | HandshakeError::Entropy(_)
        | HandshakeError::Publish(_)
        | HandshakeError::ValidationQuery(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, axum::Json(serde_json::json!({ "error": e.to_string() }))).into_response()
}

pub(crate) async fn handle_health() -> &'static str {
    "ok"
}

// ═══════════════════════════════════════════════════════════════
//  Publisher
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_publisher_home(State(state): State<PublisherState>) -> impl IntoResponse {
    Html(render::publisher_page(&state.publisher.list().await))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PublishBody {
    token: String,
    message_id: String,
}

// --- POST /whisper ---

pub(crate) async fn handle_whisper(State(state): State<PublisherState>) -> Response {
    match state.publisher.publish(&state.shutdown).await {
        Ok(p) => axum::Json(PublishBody {
            token: p.token,
            message_id: p.message_id,
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

// --- GET /validate?token=X ---

#[derive(Deserialize)]
pub(crate) struct ValidateParams {
    #[serde(alias = "randomValue")]
    token: Option<String>,
}

pub(crate) async fn handle_validate(
    State(state): State<PublisherState>,
    Query(params): Query<ValidateParams>,
) -> Response {
    let Some(token) = params.token.filter(|t| !t.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "missing token parameter").into_response();
    };
    let recently_published = state.publisher.validate_query(&token).await;
    tracing::debug!(token = %token, recently_published, "validate query");
    axum::Json(ValidateResponse { recently_published }).into_response()
}

pub(crate) async fn handle_publisher_messages(State(state): State<PublisherState>) -> impl IntoResponse {
    axum::Json(state.publisher.list().await)
}

pub(crate) async fn handle_publisher_clear(State(state): State<PublisherState>) -> StatusCode {
    state.publisher.clear().await;
    StatusCode::NO_CONTENT
}

// ═══════════════════════════════════════════════════════════════
//  Subscriber
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_subscriber_home(State(state): State<SubscriberState>) -> impl IntoResponse {
    Html(render::subscriber_page(&state.subscriber.list().await))
}

// --- POST /pubsub (push delivery) ---

pub(crate) async fn handle_push(State(state): State<SubscriberState>, body: Bytes) -> Response {
    match state.subscriber.deliver(&body).await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(e) => error_response(&e),
    }
}

pub(crate) async fn handle_subscriber_messages(State(state): State<SubscriberState>) -> impl IntoResponse {
    axum::Json(state.subscriber.list().await)
}

pub(crate) async fn handle_subscriber_clear(State(state): State<SubscriberState>) -> StatusCode {
    state.subscriber.clear().await;
    StatusCode::NO_CONTENT
}
