pub mod credential;
pub mod loopback;
pub mod rest;
pub mod validation;

pub use credential::{NoCredential, StaticCredential, configured_token, credential_from};
pub use loopback::LoopbackTransport;
pub use rest::{DEFAULT_ENDPOINT, PubSubRestPublisher};
pub use validation::HttpValidationClient;

use whisper_api::TransportError;

fn request_error(context: &str, e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::timeout(format!("{context}: {e}"))
    } else if e.is_builder() {
        TransportError::config(format!("{context}: {e}"))
    } else {
        TransportError::io(format!("{context}: {e}"))
    }
}

/// Map a non-success HTTP status to an error, keeping the body for context.
fn status_error(context: &str, status: reqwest::StatusCode, body: &str) -> TransportError {
    let msg = format!("{context}: {status}: {}", body.trim());
    match status {
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => TransportError::unauthorized(msg),
        reqwest::StatusCode::REQUEST_TIMEOUT | reqwest::StatusCode::GATEWAY_TIMEOUT => TransportError::timeout(msg),
        _ => TransportError::rejected(msg),
    }
}
