use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::{SubscriberArgs, SubscriberSettings};
use crate::error::ServerError;
use message_store::BoundedStore;
use pubsub_transport::{HttpValidationClient, configured_token, credential_from};
use whisper_engine::Subscriber;
use whisper_api_server::subscriber_router;

pub async fn run(args: SubscriberArgs) -> Result<(), ServerError> {
    tracing::info!("whisper subscriber starting");

    let settings = SubscriberSettings::resolve(&args)?;

    let store = Arc::new(BoundedStore::new(settings.capacity)?);
    let validator = HttpValidationClient::new(
        &settings.publisher_url,
        credential_from(settings.publisher_credential.as_deref()),
        settings.query_timeout,
    )?;
    tracing::info!(
        config = %args.common.config,
        validate_url = %validator.validate_url(),
        capacity = settings.capacity,
        authenticated = configured_token(settings.publisher_credential.as_deref()).is_some(),
        "loaded config"
    );

    let subscriber = Arc::new(
        Subscriber::new(store, Arc::new(validator)).with_query_timeout(settings.query_timeout),
    );

    let app = subscriber_router(subscriber);
    super::serve_until_ctrl_c(settings.port, app, CancellationToken::new()).await
}
