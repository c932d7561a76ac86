use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use whisper_api::{CredentialProvider, TransportError};

/// Requests go out without an `Authorization` header (emulator, private network).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredential;

impl CredentialProvider for NoCredential {
    fn authorization(&self) -> Pin<Box<dyn Future<Output = Result<Option<String>, TransportError>> + Send + '_>> {
        Box::pin(async { Ok(None) })
    }
}

/// A bearer token minted outside the process, e.g. an identity token for
/// the proxy in front of the publisher.
#[derive(Clone)]
pub struct StaticCredential {
    header: String,
}

impl StaticCredential {
    pub fn bearer(token: impl AsRef<str>) -> Self {
        Self {
            header: format!("Bearer {}", token.as_ref().trim()),
        }
    }
}

impl std::fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticCredential(<redacted>)")
    }
}

impl CredentialProvider for StaticCredential {
    fn authorization(&self) -> Pin<Box<dyn Future<Output = Result<Option<String>, TransportError>> + Send + '_>> {
        Box::pin(async { Ok(Some(self.header.clone())) })
    }
}

/// The configured token, trimmed, or `None` when it is unset or blank.
pub fn configured_token(token: Option<&str>) -> Option<&str> {
    token.map(str::trim).filter(|t| !t.is_empty())
}

/// Bearer credential when a token is configured, none otherwise.
pub fn credential_from(token: Option<&str>) -> Arc<dyn CredentialProvider> {
    match configured_token(token) {
        Some(t) => Arc::new(StaticCredential::bearer(t)),
        None => Arc::new(NoCredential),
    }
}
