mod http;
pub mod render;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio_util::sync::CancellationToken;

use whisper_engine::{Publisher, Subscriber};

#[derive(Debug, thiserror::Error)]
pub enum ApiServerError {
    #[error("bind api :{port}: {source}")]
    Bind { port: u16, source: std::io::Error },

    #[error("axum serve: {0}")]
    Serve(#[source] std::io::Error),
}

#[derive(Clone)]
pub struct PublisherState {
    publisher: Arc<Publisher>,
    /// In-flight publishes abort when this is cancelled.
    shutdown: CancellationToken,
}

#[derive(Clone)]
pub struct SubscriberState {
    subscriber: Arc<Subscriber>,
}

/// Routes of the publisher service.
pub fn publisher_router(publisher: Arc<Publisher>, shutdown: CancellationToken) -> Router {
    Router::new()
        .route("/", get(http::handle_publisher_home))
        .route("/whisper", post(http::handle_whisper))
        .route("/validate", get(http::handle_validate))
        .route("/messages", get(http::handle_publisher_messages))
        .route("/clear", post(http::handle_publisher_clear))
        .route("/healthz", get(http::handle_health))
        .with_state(PublisherState { publisher, shutdown })
}

/// Routes of the subscriber service. `/pubsub` is the push endpoint.
pub fn subscriber_router(subscriber: Arc<Subscriber>) -> Router {
    Router::new()
        .route("/", get(http::handle_subscriber_home))
        .route("/pubsub", post(http::handle_push))
        .route("/messages", get(http::handle_subscriber_messages))
        .route("/clear", post(http::handle_subscriber_clear))
        .route("/healthz", get(http::handle_health))
        .with_state(SubscriberState { subscriber })
}

/// Both roles in one process: publisher routes at the root, subscriber
/// routes under `/subscriber`.
pub fn standalone_router(publisher: Arc<Publisher>, subscriber: Arc<Subscriber>, shutdown: CancellationToken) -> Router {
    publisher_router(publisher, shutdown).nest("/subscriber", subscriber_router(subscriber))
}

/// Serve `app` on `0.0.0.0:{port}` until `shutdown` is cancelled.
pub async fn run(port: u16, app: Router, shutdown: CancellationToken) -> Result<(), ApiServerError> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|source| ApiServerError::Bind { port, source })?;

    tracing::info!(port, "api server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(ApiServerError::Serve)?;

    Ok(())
}
