use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use whisper_api::{CredentialProvider, TransportError, ValidateResponse, ValidationClient};

use crate::{request_error, status_error};

/// Asks the publisher's `GET /validate?token=` endpoint, attaching the
/// configured credential to every request.
pub struct HttpValidationClient {
    http: reqwest::Client,
    validate_url: reqwest::Url,
    credential: Arc<dyn CredentialProvider>,
}

impl HttpValidationClient {
    pub fn new(
        publisher_url: &str,
        credential: Arc<dyn CredentialProvider>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let raw = format!("{}/validate", publisher_url.trim_end_matches('/'));
        let validate_url = reqwest::Url::parse(&raw)
            .map_err(|e| TransportError::config(format!("publisher url '{publisher_url}': {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::config(format!("HTTP client: {e}")))?;

        Ok(Self { http, validate_url, credential })
    }

    pub fn validate_url(&self) -> &str {
        self.validate_url.as_str()
    }

    async fn query(&self, token: &str) -> Result<bool, TransportError> {
        let mut req = self.http.get(self.validate_url.clone()).query(&[("token", token)]);
        if let Some(auth) = self.credential.authorization().await? {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }

        let resp = req.send().await.map_err(|e| request_error("validate", e))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error("validate", status, &body));
        }

        let answer: ValidateResponse = resp
            .json()
            .await
            .map_err(|e| TransportError::format_err(format!("validate response: {e}")))?;
        Ok(answer.recently_published)
    }
}

impl ValidationClient for HttpValidationClient {
    fn recently_published(&self, token: &str) -> Pin<Box<dyn Future<Output = Result<bool, TransportError>> + Send + '_>> {
        let token = token.to_string();
        Box::pin(async move { self.query(&token).await })
    }
}
