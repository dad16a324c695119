//! HTTP server startup.

use std::net::SocketAddr;

use rusqlite::Connection;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

/// Serve the registry API on `addr` until the task is cancelled.
pub async fn serve(addr: SocketAddr, conn: Connection) -> std::io::Result<()> {
    let router = api_router(ApiContext::new(conn));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "registry API listening");
    axum::serve(listener, router).await
}
