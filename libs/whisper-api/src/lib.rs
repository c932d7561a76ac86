pub mod error;
pub mod push;
pub mod transport;

use serde::{Deserialize, Serialize};

pub use error::{DecodeError, TransportError, TransportErrorKind};
pub use push::{PushEnvelope, PushMessage};
pub use transport::{CredentialProvider, TransportPublisher, ValidationClient};

// ════════════════════════════════════════════════════════════════
//  Records
// ════════════════════════════════════════════════════════════════

/// A record that can be looked up by an identifying string.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// A token the publisher has emitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub content: String,
    /// Unix epoch milliseconds.
    pub created_at_ms: i64,
}

impl MessageRecord {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            created_at_ms: now_ms(),
        }
    }
}

impl Keyed for MessageRecord {
    fn key(&self) -> &str {
        &self.content
    }
}

/// A token the subscriber has received, with the outcome of the
/// cross-check against the publisher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedRecord {
    pub random_value: String,
    /// Unix epoch milliseconds.
    pub received_at_ms: i64,
    pub validated: bool,
}

impl ReceivedRecord {
    pub fn new(random_value: impl Into<String>, validated: bool) -> Self {
        Self {
            random_value: random_value.into(),
            received_at_ms: now_ms(),
            validated,
        }
    }
}

impl Keyed for ReceivedRecord {
    fn key(&self) -> &str {
        &self.random_value
    }
}

// ════════════════════════════════════════════════════════════════
//  Wire types
// ════════════════════════════════════════════════════════════════

/// Answer of the publisher's `GET /validate` endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub recently_published: bool,
}

/// Текущее Unix-время в миллисекундах.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_response_uses_camel_case() {
        let json = serde_json::to_string(&ValidateResponse { recently_published: true }).unwrap();
        assert_eq!(json, r#"{"recentlyPublished":true}"#);
    }

    #[test]
    fn records_are_keyed_by_token() {
        assert_eq!(MessageRecord::new("a1f3").key(), "a1f3");
        assert_eq!(ReceivedRecord::new("b2e7", false).key(), "b2e7");
    }
}
