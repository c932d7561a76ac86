use std::sync::Arc;

use axum::Router;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{StandaloneArgs, StandaloneSettings};
use crate::error::ServerError;
use message_store::BoundedStore;
use pubsub_transport::LoopbackTransport;
use whisper_engine::{LocalValidator, Publisher, Subscriber, TokenGenerator, spawn_delivery_task};
use whisper_api_server::standalone_router;

const SUBSCRIPTION: &str = "standalone";
const INBOX_BUFFER: usize = 64;

/// Wire both roles around one in-memory transport. The subscriber validates
/// against the publisher store directly, no side channel involved.
pub async fn build(
    settings: &StandaloneSettings,
    token: CancellationToken,
) -> Result<(Router, JoinHandle<()>), ServerError> {
    let bus = Arc::new(LoopbackTransport::new(SUBSCRIPTION));
    let inbox = bus.subscribe(INBOX_BUFFER).await;

    let publisher = Arc::new(
        Publisher::new(
            Arc::new(BoundedStore::new(settings.capacity)?),
            Arc::new(TokenGenerator::new(settings.token_len)?),
            bus,
        )
        .with_ack_timeout(settings.ack_timeout),
    );
    let subscriber = Arc::new(Subscriber::new(
        Arc::new(BoundedStore::new(settings.capacity)?),
        Arc::new(LocalValidator::new(publisher.store().clone())),
    ));

    let delivery = spawn_delivery_task(subscriber.clone(), inbox, token.clone());
    Ok((standalone_router(publisher, subscriber, token), delivery))
}

pub async fn run(args: StandaloneArgs) -> Result<(), ServerError> {
    tracing::info!("whisper standalone starting");

    let settings = StandaloneSettings::resolve(&args)?;
    tracing::info!(
        config = %args.common.config,
        capacity = settings.capacity,
        token_len = settings.token_len,
        "loaded config"
    );

    let token = CancellationToken::new();
    let (app, delivery) = build(&settings, token.clone()).await?;
    let served = super::serve_until_ctrl_c(settings.port, app, token.clone()).await;

    token.cancel();
    delivery.await?;
    served
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    fn settings(capacity: usize) -> StandaloneSettings {
        StandaloneSettings {
            port: 0,
            capacity,
            token_len: 4,
            ack_timeout: Duration::from_secs(1),
        }
    }

    async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn published_token_shows_up_validated() {
        let token = CancellationToken::new();
        let (app, delivery) = build(&settings(5), token.clone()).await.unwrap();

        let (status, published) = call(&app, Request::post("/whisper").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);

        let mut received = Value::Null;
        for _ in 0..200 {
            (_, received) = call(&app, Request::get("/subscriber/messages").body(Body::empty()).unwrap()).await;
            if received.as_array().is_some_and(|l| !l.is_empty()) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(received[0]["randomValue"], published["token"]);
        assert_eq!(received[0]["validated"], true);

        token.cancel();
        delivery.await.unwrap();
    }

    #[tokio::test]
    async fn zero_capacity_fails_startup() {
        let err = build(&settings(0), CancellationToken::new()).await.err().unwrap();
        assert!(matches!(err, ServerError::Store(_)));
    }
}
