mod routes;

pub use routes::{AppState, router};

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

/// Binds the HTTP front end and serves until ctrl-c.
pub async fn serve(state: AppState, static_dir: &Path, port: u16) -> Result<()> {
    if !static_dir.join("index.html").is_file() {
        warn!(dir = %static_dir.display(), "Static front end not found, serving API only");
    }

    let app = router(state, static_dir);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "Server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down gracefully");
        })
        .await?;

    Ok(())
}
