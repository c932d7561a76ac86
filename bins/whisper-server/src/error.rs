#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("store: {0}")]
    Store(#[from] message_store::StoreError),

    #[error("{0}")]
    Handshake(#[from] whisper_engine::HandshakeError),

    #[error("transport: {0}")]
    Transport(#[from] whisper_api::TransportError),

    #[error("{0}")]
    Api(#[from] whisper_api_server::ApiServerError),

    #[error("api task: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("signal: {0}")]
    Signal(#[from] std::io::Error),
}

impl ServerError {
    pub fn config(context: &'static str, detail: impl Into<String>) -> Self {
        ServerError::Config { context, detail: detail.into() }
    }
}
