use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde_json::{Value, json};

use pubsub_transport::{HttpValidationClient, NoCredential, PubSubRestPublisher, StaticCredential};
use whisper_api::{TransportErrorKind, TransportPublisher, ValidationClient};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers.get("authorization").and_then(|v| v.to_str().ok())
}

// --- fake Pub/Sub: POST /v1/projects/{project}/topics/{topic} ---

async fn fake_publish(
    Path((project, topic)): Path<(String, String)>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> impl IntoResponse {
    if bearer(&headers) != Some("Bearer pubsub-token") {
        return (StatusCode::UNAUTHORIZED, axum::Json(json!({"error": "missing credential"})));
    }
    if project != "demo" || topic != "whispers:publish" {
        return (StatusCode::NOT_FOUND, axum::Json(json!({"error": "topic not found"})));
    }
    let data = body["messages"][0]["data"].as_str().unwrap_or_default();
    // "a1f3" in base64
    if data != "YTFmMw==" {
        return (StatusCode::BAD_REQUEST, axum::Json(json!({"error": "unexpected data"})));
    }
    (StatusCode::OK, axum::Json(json!({"messageIds": ["4711"]})))
}

async fn fake_topic(Path((project, topic)): Path<(String, String)>) -> impl IntoResponse {
    if project == "demo" && topic == "whispers" {
        (StatusCode::OK, axum::Json(json!({"name": "projects/demo/topics/whispers"})))
    } else {
        (StatusCode::NOT_FOUND, axum::Json(json!({"error": "Resource not found"})))
    }
}

fn pubsub_app() -> Router {
    Router::new().route("/v1/projects/{project}/topics/{topic}", post(fake_publish).get(fake_topic))
}

#[tokio::test]
async fn topic_lookup_detects_missing_topic() {
    let base = serve(pubsub_app()).await;
    let existing = PubSubRestPublisher::new(&base, "demo", "whispers", Arc::new(NoCredential), Duration::from_secs(5))
        .unwrap();
    let missing = PubSubRestPublisher::new(&base, "demo", "nope", Arc::new(NoCredential), Duration::from_secs(5))
        .unwrap();

    existing.ensure_topic().await.unwrap();
    let err = missing.ensure_topic().await.unwrap_err();
    assert_eq!(err.kind(), TransportErrorKind::Config);
}

#[tokio::test]
async fn rest_publisher_returns_message_id() {
    let base = serve(pubsub_app()).await;
    let publisher = PubSubRestPublisher::new(
        &base,
        "demo",
        "whispers",
        Arc::new(StaticCredential::bearer("pubsub-token")),
        Duration::from_secs(5),
    )
    .unwrap();

    let id = publisher.publish(b"a1f3".to_vec()).await.unwrap();
    assert_eq!(id, "4711");
}

#[tokio::test]
async fn rest_publisher_maps_auth_failure() {
    let base = serve(pubsub_app()).await;
    let publisher = PubSubRestPublisher::new(&base, "demo", "whispers", Arc::new(NoCredential), Duration::from_secs(5))
        .unwrap();

    let err = publisher.publish(b"a1f3".to_vec()).await.unwrap_err();
    assert_eq!(err.kind(), TransportErrorKind::Unauthorized);
}

#[tokio::test]
async fn rest_publisher_maps_unknown_topic() {
    let base = serve(pubsub_app()).await;
    let publisher = PubSubRestPublisher::new(
        &base,
        "demo",
        "missing",
        Arc::new(StaticCredential::bearer("pubsub-token")),
        Duration::from_secs(5),
    )
    .unwrap();

    let err = publisher.publish(b"a1f3".to_vec()).await.unwrap_err();
    assert_eq!(err.kind(), TransportErrorKind::Rejected);
}

// --- fake publisher: GET /validate?token= ---

async fn fake_validate(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    if bearer(&headers) != Some("Bearer id-token") {
        return (StatusCode::FORBIDDEN, "forbidden").into_response();
    }
    let known = params.get("token").map(String::as_str) == Some("b2e7");
    axum::Json(json!({"recentlyPublished": known})).into_response()
}

fn publisher_app() -> Router {
    Router::new()
        .route("/validate", get(fake_validate))
        .route("/broken/validate", get(|| async { "not json" }))
}

#[tokio::test]
async fn validation_client_reads_answer() {
    let base = serve(publisher_app()).await;
    let client =
        HttpValidationClient::new(&base, Arc::new(StaticCredential::bearer("id-token")), Duration::from_secs(5)).unwrap();

    assert!(client.recently_published("b2e7").await.unwrap());
    assert!(!client.recently_published("ffff").await.unwrap());
}

#[tokio::test]
async fn validation_client_surfaces_forbidden() {
    let base = serve(publisher_app()).await;
    let client = HttpValidationClient::new(&base, Arc::new(NoCredential), Duration::from_secs(5)).unwrap();

    let err = client.recently_published("b2e7").await.unwrap_err();
    assert_eq!(err.kind(), TransportErrorKind::Unauthorized);
}

#[tokio::test]
async fn validation_client_surfaces_bad_body() {
    let base = serve(publisher_app()).await;
    let client = HttpValidationClient::new(&format!("{base}/broken"), Arc::new(NoCredential), Duration::from_secs(5))
        .unwrap();

    let err = client.recently_published("b2e7").await.unwrap_err();
    assert_eq!(err.kind(), TransportErrorKind::Format);
}

#[tokio::test]
async fn validation_client_surfaces_unreachable_publisher() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpValidationClient::new(&format!("http://{addr}"), Arc::new(NoCredential), Duration::from_secs(2))
        .unwrap();
    let err = client.recently_published("b2e7").await.unwrap_err();
    assert!(matches!(err.kind(), TransportErrorKind::Io | TransportErrorKind::Timeout));
}
