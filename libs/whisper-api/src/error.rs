/// Category of a collaborator failure. Lets the handshakes and the HTTP
/// layer decide how to report it without inspecting message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Invalid client configuration (bad URL, TLS setup).
    Config,
    /// Network or I/O failure, may succeed on retry.
    Io,
    /// The call did not complete within its deadline.
    Timeout,
    /// The remote side answered with a non-success status.
    Rejected,
    /// The credential was refused or could not be obtained.
    Unauthorized,
    /// The response body could not be understood.
    Format,
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportErrorKind::Config => f.write_str("config"),
            TransportErrorKind::Io => f.write_str("io"),
            TransportErrorKind::Timeout => f.write_str("timeout"),
            TransportErrorKind::Rejected => f.write_str("rejected"),
            TransportErrorKind::Unauthorized => f.write_str("unauthorized"),
            TransportErrorKind::Format => f.write_str("format"),
        }
    }
}

/// Error returned by every collaborator trait (publish, validation query,
/// credentials). Carries a kind and a human-readable message.
#[derive(Clone, PartialEq, Eq)]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, msg: impl Into<String>) -> Self {
        Self { kind, message: msg.into() }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Config, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Io, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, msg)
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Rejected, msg)
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unauthorized, msg)
    }

    pub fn format_err(msg: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Format, msg)
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Debug for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for TransportError {}

impl From<serde_json::Error> for TransportError {
    fn from(e: serde_json::Error) -> Self {
        Self::format_err(e.to_string())
    }
}

/// Failure to turn an inbound push body into a token.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed push envelope: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("message data is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("message data is empty")]
    Empty,
}
