use message_store::StoreError;
use whisper_api::{DecodeError, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("entropy source: {0}")]
    Entropy(String),

    #[error("publish failed: {0}")]
    Publish(TransportError),

    #[error("undecodable delivery: {0}")]
    Decode(#[from] DecodeError),

    #[error("validation query failed: {0}")]
    ValidationQuery(TransportError),

    #[error("cancelled while waiting for publish acknowledgement")]
    Cancelled,
}

impl From<StoreError> for HandshakeError {
    fn from(e: StoreError) -> Self {
        HandshakeError::Config(e.to_string())
    }
}
