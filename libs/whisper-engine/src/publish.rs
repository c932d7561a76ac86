use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use message_store::BoundedStore;
use whisper_api::{MessageRecord, TransportError, TransportPublisher};

use crate::HandshakeError;
use crate::token::TokenSource;

pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub token: String,
    pub message_id: String,
}

// ═══════════════════════════════════════════════════════════════
//  Publisher
// ═══════════════════════════════════════════════════════════════

/// Publisher role: generate → record → emit → respond.
///
/// The token is in the store before the transport sees it, so a subscriber
/// that validates as soon as the push arrives always finds it. A failed or
/// cancelled emit leaves the record in place; the store is history, not a
/// pending-work queue.
pub struct Publisher {
    store: Arc<BoundedStore<MessageRecord>>,
    tokens: Arc<dyn TokenSource>,
    transport: Arc<dyn TransportPublisher>,
    ack_timeout: Duration,
}

impl Publisher {
    pub fn new(
        store: Arc<BoundedStore<MessageRecord>>,
        tokens: Arc<dyn TokenSource>,
        transport: Arc<dyn TransportPublisher>,
    ) -> Self {
        Self {
            store,
            tokens,
            transport,
            ack_timeout: DEFAULT_ACK_TIMEOUT,
        }
    }

    pub fn with_ack_timeout(mut self, ack_timeout: Duration) -> Self {
        self.ack_timeout = ack_timeout;
        self
    }

    pub fn store(&self) -> &Arc<BoundedStore<MessageRecord>> {
        &self.store
    }

    pub async fn publish(&self, cancel: &CancellationToken) -> Result<Published, HandshakeError> {
        // 1. Generate
        let token = self.tokens.generate()?;

        // 2. Record (before emit)
        self.store.add(MessageRecord::new(token.clone())).await;

        // 3. Emit, waiting for the transport acknowledgement
        let emit = tokio::time::timeout(self.ack_timeout, self.transport.publish(token.clone().into_bytes()));
        let message_id = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::warn!(token = %token, "publish cancelled before acknowledgement");
                return Err(HandshakeError::Cancelled);
            }

            result = emit => match result {
                Ok(Ok(id)) => id,
                Ok(Err(e)) => {
                    tracing::error!(token = %token, error = %e, "transport rejected publish");
                    return Err(HandshakeError::Publish(e));
                }
                Err(_) => {
                    tracing::error!(token = %token, timeout = ?self.ack_timeout, "publish acknowledgement timed out");
                    return Err(HandshakeError::Publish(TransportError::timeout(format!(
                        "no acknowledgement within {:?}",
                        self.ack_timeout
                    ))));
                }
            },
        };

        // 4. Respond
        tracing::info!(token = %token, message_id = %message_id, "published token");
        Ok(Published { token, message_id })
    }

    /// Whether `token` is in the recent history.
    pub async fn validate_query(&self, token: &str) -> bool {
        self.store.contains(token).await
    }

    pub async fn list(&self) -> Vec<MessageRecord> {
        self.store.snapshot().await
    }

    pub async fn clear(&self) {
        self.store.clear().await;
        tracing::info!("publisher history cleared");
    }
}
