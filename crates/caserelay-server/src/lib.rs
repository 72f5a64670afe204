pub mod config;
mod routes;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use anyhow::Result;
use caserelay_service::RelayService;
use tokio::net::TcpListener;
use tracing::info;

pub use routes::{build_router, HttpSettings};

pub async fn serve(listener: TcpListener, relay: RelayService, settings: HttpSettings) -> Result<()> {
    let app = routes::build_router(relay, &settings);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("cannot listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
