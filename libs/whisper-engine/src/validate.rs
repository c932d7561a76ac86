use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use message_store::BoundedStore;
use whisper_api::{MessageRecord, PushEnvelope, ReceivedRecord, TransportError, ValidationClient};

use crate::HandshakeError;

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

// ═══════════════════════════════════════════════════════════════
//  Subscriber
// ═══════════════════════════════════════════════════════════════

/// Subscriber role: decode → remote check → record → acknowledge.
///
/// Only a decode failure rejects the delivery. A failed remote check is
/// recorded as `validated = false` and the delivery is still acknowledged.
pub struct Subscriber {
    store: Arc<BoundedStore<ReceivedRecord>>,
    validator: Arc<dyn ValidationClient>,
    query_timeout: Duration,
}

impl Subscriber {
    pub fn new(store: Arc<BoundedStore<ReceivedRecord>>, validator: Arc<dyn ValidationClient>) -> Self {
        Self {
            store,
            validator,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    pub fn store(&self) -> &Arc<BoundedStore<ReceivedRecord>> {
        &self.store
    }

    /// Handle one push delivery. `Err` means the transport should redeliver.
    pub async fn deliver(&self, body: &[u8]) -> Result<ReceivedRecord, HandshakeError> {
        let token = PushEnvelope::decode_token(body).inspect_err(|e| {
            tracing::warn!(error = %e, "rejecting undecodable delivery");
        })?;

        let validated = match self.remote_check(&token).await {
            Ok(validated) => validated,
            Err(e) => {
                tracing::warn!(token = %token, error = %e, "recording token as unvalidated");
                false
            }
        };

        let record = ReceivedRecord::new(token, validated);
        self.store.add(record.clone()).await;
        tracing::info!(token = %record.random_value, validated, "received token");
        Ok(record)
    }

    /// Ask the publisher about `token`, bounded by the query timeout.
    pub async fn remote_check(&self, token: &str) -> Result<bool, HandshakeError> {
        match tokio::time::timeout(self.query_timeout, self.validator.recently_published(token)).await {
            Ok(Ok(found)) => Ok(found),
            Ok(Err(e)) => Err(HandshakeError::ValidationQuery(e)),
            Err(_) => Err(HandshakeError::ValidationQuery(TransportError::timeout(format!(
                "no answer within {:?}",
                self.query_timeout
            )))),
        }
    }

    /// Received tokens, newest last.
    pub async fn list(&self) -> Vec<ReceivedRecord> {
        self.store.snapshot().await
    }

    pub async fn clear(&self) {
        self.store.clear().await;
        tracing::info!("received messages cleared");
    }
}

// ═══════════════════════════════════════════════════════════════
//  Delivery task: inbox → subscriber.deliver()
// ═══════════════════════════════════════════════════════════════

/// Запустить delivery task: feeds every push body from `inbox` into the
/// subscriber until the channel closes or `token` is cancelled.
pub fn spawn_delivery_task(
    subscriber: Arc<Subscriber>,
    mut inbox: mpsc::Receiver<Vec<u8>>,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                body = inbox.recv() => {
                    match body {
                        // deliver() logs its own failures
                        Some(body) => {
                            let _ = subscriber.deliver(&body).await;
                        }
                        None => break,
                    }
                }
                _ = token.cancelled() => break,
            }
        }
        tracing::info!("delivery task stopped");
    })
}

// ═══════════════════════════════════════════════════════════════
//  LocalValidator
// ═══════════════════════════════════════════════════════════════

/// In-process `ValidationClient` reading a publisher store directly.
/// Used when both roles run in one process.
pub struct LocalValidator {
    store: Arc<BoundedStore<MessageRecord>>,
}

impl LocalValidator {
    pub fn new(store: Arc<BoundedStore<MessageRecord>>) -> Self {
        Self { store }
    }
}

impl ValidationClient for LocalValidator {
    fn recently_published(&self, token: &str) -> Pin<Box<dyn Future<Output = Result<bool, TransportError>> + Send + '_>> {
        let token = token.to_string();
        Box::pin(async move { Ok(self.store.contains(&token).await) })
    }
}
