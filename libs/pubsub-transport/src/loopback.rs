use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{RwLock, mpsc};

use whisper_api::{PushEnvelope, TransportError, TransportPublisher};

/// In-process transport. Each publish is wrapped in a push envelope and
/// fanned out to every subscribed channel.
///
/// A full subscriber channel drops the message (logged), a closed one is
/// pruned. Publishing with no subscribers still succeeds.
pub struct LoopbackTransport {
    subscription: String,
    next_id: AtomicU64,
    subscribers: RwLock<Vec<mpsc::Sender<Vec<u8>>>>,
}

impl LoopbackTransport {
    pub fn new(subscription: impl Into<String>) -> Self {
        Self {
            subscription: subscription.into(),
            next_id: AtomicU64::new(0),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Register a subscriber channel; the receiver yields push bodies (JSON envelopes).
    pub async fn subscribe(&self, buffer: usize) -> mpsc::Receiver<Vec<u8>> {
        let (tx, rx) = mpsc::channel(buffer);
        self.subscribers.write().await.push(tx);
        rx
    }

    async fn fan_out(&self, payload: Vec<u8>) -> Result<String, TransportError> {
        let id = (self.next_id.fetch_add(1, Ordering::Relaxed) + 1).to_string();
        let body = PushEnvelope::wrap(&payload, id.clone(), self.subscription.clone()).to_json();

        let mut subs = self.subscribers.write().await;
        let mut i = 0;
        while i < subs.len() {
            match subs[i].try_send(body.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(subscription = %self.subscription, message_id = %id, "subscriber channel full, dropping");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    subs.swap_remove(i);
                    continue;
                }
            }
            i += 1;
        }

        Ok(id)
    }
}

impl TransportPublisher for LoopbackTransport {
    fn publish(&self, payload: Vec<u8>) -> Pin<Box<dyn Future<Output = Result<String, TransportError>> + Send + '_>> {
        Box::pin(self.fan_out(payload))
    }
}
