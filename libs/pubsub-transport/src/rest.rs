use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use serde::{Deserialize, Serialize};

use whisper_api::{CredentialProvider, TransportError, TransportPublisher};

use crate::{request_error, status_error};

pub const DEFAULT_ENDPOINT: &str = "https://pubsub.googleapis.com";

#[derive(Serialize)]
struct PublishRequest {
    messages: Vec<OutboundMessage>,
}

#[derive(Serialize)]
struct OutboundMessage {
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}

/// Cloud Pub/Sub `topics.publish` over REST.
///
/// `POST {endpoint}/v1/projects/{project}/topics/{topic}:publish` with the
/// payload base64-encoded. The call returns once the service has accepted
/// the message and assigned it an id.
pub struct PubSubRestPublisher {
    http: reqwest::Client,
    topic_url: String,
    url: String,
    credential: Arc<dyn CredentialProvider>,
}

impl PubSubRestPublisher {
    pub fn new(
        endpoint: &str,
        project_id: &str,
        topic: &str,
        credential: Arc<dyn CredentialProvider>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        if project_id.is_empty() || topic.is_empty() {
            return Err(TransportError::config("project id and topic must be set"));
        }
        let topic_url = format!(
            "{}/v1/projects/{project_id}/topics/{topic}",
            endpoint.trim_end_matches('/')
        );
        let url = format!("{topic_url}:publish");
        reqwest::Url::parse(&url).map_err(|e| TransportError::config(format!("pubsub url '{url}': {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::config(format!("HTTP client: {e}")))?;

        Ok(Self { http, topic_url, url, credential })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn authorized(&self, req: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, TransportError> {
        Ok(match self.credential.authorization().await? {
            Some(auth) => req.header(reqwest::header::AUTHORIZATION, auth),
            None => req,
        })
    }

    /// Fail unless the topic exists. Called once at startup.
    pub async fn ensure_topic(&self) -> Result<(), TransportError> {
        let req = self.authorized(self.http.get(&self.topic_url)).await?;
        let resp = req.send().await.map_err(|e| request_error("pubsub topic lookup", e))?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(TransportError::config(format!("topic {} does not exist", self.topic_url)));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error("pubsub topic lookup", status, &body));
        }
        Ok(())
    }

    async fn send(&self, payload: Vec<u8>) -> Result<String, TransportError> {
        let body = PublishRequest {
            messages: vec![OutboundMessage {
                data: base64::engine::general_purpose::STANDARD.encode(payload),
            }],
        };

        let req = self.authorized(self.http.post(&self.url).json(&body)).await?;

        let resp = req.send().await.map_err(|e| request_error("pubsub publish", e))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error("pubsub publish", status, &body));
        }

        let parsed: PublishResponse = resp
            .json()
            .await
            .map_err(|e| TransportError::format_err(format!("pubsub publish response: {e}")))?;
        parsed
            .message_ids
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::format_err("pubsub publish response carried no message id"))
    }
}

impl TransportPublisher for PubSubRestPublisher {
    fn publish(&self, payload: Vec<u8>) -> Pin<Box<dyn Future<Output = Result<String, TransportError>> + Send + '_>> {
        Box::pin(self.send(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoCredential;

    #[test]
    fn builds_topic_url() {
        let p = PubSubRestPublisher::new(
            "http://localhost:8085/",
            "demo",
            "whispers",
            Arc::new(NoCredential),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(p.url(), "http://localhost:8085/v1/projects/demo/topics/whispers:publish");
    }

    #[test]
    fn missing_topic_is_config_error() {
        let err = PubSubRestPublisher::new(DEFAULT_ENDPOINT, "demo", "", Arc::new(NoCredential), Duration::from_secs(1))
            .err()
            .unwrap();
        assert_eq!(err.kind(), whisper_api::TransportErrorKind::Config);
    }
}
