//! HTTP server assembly.

mod router;
mod state;

pub use router::create_router;
pub use state::ServerState;

use std::net::SocketAddr;

use tracing::info;

/// Bind and run the control surface until ctrl-c.
pub async fn serve(state: ServerState, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "control surface listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
        // Fall through: without a signal handler the server runs until the
        // process is killed.
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
