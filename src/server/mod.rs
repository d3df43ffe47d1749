//! HTTP boundary
//!
//! Serves the export endpoint over axum with graceful shutdown driven by a
//! `watch` channel.

pub mod auth;
pub mod error;
pub mod router;

pub use auth::{ApiKeyStore, Principal};
pub use error::ApiError;
pub use router::{build_router, AppState};

use crate::domain::{ExportError, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Serve `app` on `listener` until `shutdown` flips to `true`
///
/// In-flight requests are allowed to finish.
///
/// # Errors
///
/// Returns an I/O error if the server fails while running.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "C-CDA export server listening");

    let shutdown_signal = async move {
        while !*shutdown.borrow() {
            if shutdown.changed().await.is_err() {
                // Sender gone: no signal can arrive any more
                std::future::pending::<()>().await;
            }
        }
        tracing::info!("Server received shutdown signal");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ExportError::Io(format!("Server error: {e}")))?;

    tracing::info!("Server stopped");
    Ok(())
}
