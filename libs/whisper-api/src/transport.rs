use std::future::Future;
use std::pin::Pin;

use crate::TransportError;

// ════════════════════════════════════════════════════════════════
//  Collaborator traits
// ════════════════════════════════════════════════════════════════

/// Outbound side of the pub/sub transport.
///
/// Implementations: `PubSubRestPublisher` (Cloud Pub/Sub REST),
/// `LoopbackTransport` (in-process fan-out).
pub trait TransportPublisher: Send + Sync {
    /// Publish raw bytes and wait until the transport accepts them.
    /// Returns the transport-assigned message id.
    fn publish(&self, payload: Vec<u8>) -> Pin<Box<dyn Future<Output = Result<String, TransportError>> + Send + '_>>;
}

/// Authenticated side channel from the subscriber to the publisher.
pub trait ValidationClient: Send + Sync {
    /// Ask the publisher whether `token` is in its recent history.
    fn recently_published(&self, token: &str) -> Pin<Box<dyn Future<Output = Result<bool, TransportError>> + Send + '_>>;
}

/// Source of the identity credential attached to side-channel requests.
///
/// The identity provider itself lives outside this workspace; an
/// implementation only has to produce the `Authorization` header value.
pub trait CredentialProvider: Send + Sync {
    /// `Ok(None)` means the request goes out without credentials.
    fn authorization(&self) -> Pin<Box<dyn Future<Output = Result<Option<String>, TransportError>> + Send + '_>>;
}
