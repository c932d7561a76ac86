use std::collections::HashMap;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::DecodeError;

/// Body of a push delivery, as POSTed by the transport to the subscriber.
///
/// ```json
/// {"message":{"data":"YTFmMw==","messageId":"42"},"subscription":"projects/p/subscriptions/s"}
/// ```
///
/// `data` is the standard base64 encoding of the published bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEnvelope {
    pub message: PushMessage,
    #[serde(default)]
    pub subscription: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub message_id: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<String>,
}

impl PushEnvelope {
    /// Wrap raw published bytes the way the transport would push them.
    pub fn wrap(payload: &[u8], message_id: impl Into<String>, subscription: impl Into<String>) -> Self {
        Self {
            message: PushMessage {
                data: base64::engine::general_purpose::STANDARD.encode(payload),
                message_id: message_id.into(),
                ..PushMessage::default()
            },
            subscription: subscription.into(),
        }
    }

    pub fn to_json(&self) -> Vec<u8> {
        // A struct of strings and a string map always serializes.
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Parse a push body and return the token it carries.
    pub fn decode_token(body: &[u8]) -> Result<String, DecodeError> {
        let envelope: PushEnvelope = serde_json::from_slice(body)?;
        envelope.message.token()
    }
}

impl PushMessage {
    /// Decode `data` into the token string. Empty payloads are rejected.
    pub fn token(&self) -> Result<String, DecodeError> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(self.data.trim())?;
        let token = String::from_utf8(bytes)?;
        if token.is_empty() {
            return Err(DecodeError::Empty);
        }
        Ok(token)
    }
}
