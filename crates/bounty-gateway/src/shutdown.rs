//! Graceful shutdown trigger.
//!
//! Resolves on SIGINT (Ctrl+C) or, on Unix, SIGTERM. If a signal handler
//! cannot be installed that source is ignored rather than treated as a
//! shutdown request.

use std::future::Future;

/// Wait until the process is asked to stop.
pub async fn signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    wait_for(ctrl_c, terminate()).await;
    tracing::info!("shutdown signal received, draining connections");
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to listen for SIGTERM");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

/// Complete when either source fires.
async fn wait_for(interrupt: impl Future<Output = ()>, terminate: impl Future<Output = ()>) {
    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }
}
