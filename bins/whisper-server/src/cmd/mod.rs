pub mod publisher;
pub mod standalone;
pub mod subscriber;

use std::time::Duration;

use axum::Router;
use tokio_util::sync::CancellationToken;

use crate::error::ServerError;

const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Serve `app` until Ctrl+C or until the listener fails, then cancel `token`
/// and give in-flight requests a bounded window to finish.
pub async fn serve_until_ctrl_c(port: u16, app: Router, token: CancellationToken) -> Result<(), ServerError> {
    let api_token = token.clone();
    let mut api_handle = tokio::spawn(whisper_api_server::run(port, app, api_token));

    // --- Ожидание Ctrl+C ---
    tokio::select! {
        res = &mut api_handle => {
            token.cancel();
            res??;
            return Ok(());
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
        }
    }
    tracing::info!("shutting down...");

    token.cancel();

    match tokio::time::timeout(DRAIN_TIMEOUT, &mut api_handle).await {
        Ok(res) => res??,
        Err(_) => {
            tracing::warn!(timeout = ?DRAIN_TIMEOUT, "http server did not drain in time, aborting");
            api_handle.abort();
        }
    }

    tracing::info!("shutdown complete");
    Ok(())
}
