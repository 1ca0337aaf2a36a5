// HTTP listener: binds the configured address and serves the router until
// shutdown.

use std::future::Future;
use std::net::SocketAddr;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Bind a TCP listener on `addr`.
pub async fn bind(addr: SocketAddr) -> anyhow::Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {addr}"))
}

/// Serve `app` on `listener` until Ctrl+C is received.
pub async fn run(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    run_until(listener, app, ctrl_c()).await
}

/// Serve `app` on `listener` until `shutdown` completes. In-flight requests
/// are allowed to finish.
pub async fn run_until<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    info!("HTTP server listening on {local_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;

    info!("HTTP server on {local_addr} stopped");
    Ok(())
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!("Failed to listen for Ctrl+C: {e}"),
    }
}
