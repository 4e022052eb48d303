//! Server startup and graceful shutdown

use anyhow::Result;
use axum::Router;
use vidmod_core::Config;
use vidmod_worker::ProcessingQueue;

/// Start the server with graceful shutdown. The processing queue stops taking jobs once
/// the listener has drained.
pub async fn start_server(config: &Config, app: Router, queue: ProcessingQueue) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port());
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        environment = %config.environment(),
        max_video_mb = config.max_file_size_bytes() / 1024 / 1024,
        video_formats = %config.video_allowed_formats().join(","),
        processing_max_concurrent = config.processing_max_concurrent(),
        processing_queue_size = config.processing_queue_size(),
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    queue.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl+C (SIGINT) or SIGTERM. A handler that cannot be installed is logged and
/// treated as never firing.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
