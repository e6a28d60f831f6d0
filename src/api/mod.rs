//! HTTP surfaces for the two services.
//!
//! - [`extraction`]: document upload to markdown (`POST /api/v1/parse`, `GET /ping`).
//! - [`embedding`]: text to vector (`POST /api/ai/embed`, `GET /health`).
//!
//! Each service owns its router and is deployed on its own; they share no state.

pub mod embedding;
pub mod extraction;

use crate::error::Result;
use axum::Router;
use log::info;
use tokio::net::TcpListener;

/// Bind `host:port` and serve `app` until Ctrl-C.
pub async fn serve(app: Router, host: &str, port: u16, service_name: &str) -> Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    let address = listener.local_addr()?;
    info!("{} listening on http://{}", service_name, address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("{} stopped", service_name);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
