use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::{PublisherArgs, PublisherSettings};
use crate::error::ServerError;
use message_store::BoundedStore;
use pubsub_transport::{PubSubRestPublisher, credential_from};
use whisper_engine::{Publisher, TokenGenerator};
use whisper_api_server::publisher_router;

pub async fn run(args: PublisherArgs) -> Result<(), ServerError> {
    tracing::info!("whisper publisher starting");

    let settings = PublisherSettings::resolve(&args)?;
    tracing::info!(
        config = %args.common.config,
        project = %settings.project_id,
        topic = %settings.topic,
        endpoint = %settings.pubsub_endpoint,
        capacity = settings.capacity,
        token_len = settings.token_len,
        "loaded config"
    );

    let store = Arc::new(BoundedStore::new(settings.capacity)?);
    let tokens = Arc::new(TokenGenerator::new(settings.token_len)?);

    let transport = PubSubRestPublisher::new(
        &settings.pubsub_endpoint,
        &settings.project_id,
        &settings.topic,
        credential_from(settings.pubsub_token.as_deref()),
        settings.ack_timeout,
    )?;
    // Refuse to start against a topic that does not exist.
    transport.ensure_topic().await?;
    tracing::info!(url = %transport.url(), "pubsub topic found");

    let publisher = Arc::new(
        Publisher::new(store, tokens, Arc::new(transport)).with_ack_timeout(settings.ack_timeout),
    );

    let token = CancellationToken::new();
    let app = publisher_router(publisher, token.clone());
    super::serve_until_ctrl_c(settings.port, app, token).await
}
