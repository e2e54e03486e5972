//! Server lifecycle: bind, serve, shut down on signal.

use sprout_core::{Error, Result};
use tokio::net::TcpListener;

use crate::router;
use crate::state::ApiState;

/// Bind `host:port` and serve until SIGINT or SIGTERM.
///
/// Graceful shutdown stops accepting connections and lets in-flight
/// requests finish before returning.
pub async fn serve(state: ApiState, host: &str, port: u16) -> Result<()> {
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|err| Error::config(format!("cannot bind {addr}: {err}")))?;
    tracing::info!(%addr, "sprout api listening");

    let app = router::build(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| Error::config(format!("server failed: {err}")))?;

    tracing::info!("sprout api stopped");
    Ok(())
}

/// Resolves on SIGINT, or SIGTERM where that exists.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("ctrl-c handler installation failed");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("sigterm handler installation failed")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received");
}

// ============================================================================
// Tests
// ============================================================================
