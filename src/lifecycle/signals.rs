//! OS signal handling.

use crate::lifecycle::Shutdown;

/// Trigger `shutdown` on the first SIGINT/SIGTERM and exit the process on
/// the second.
pub fn shutdown_on_ctrl_c(shutdown: Shutdown) {
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::warn!("Signal received, cancelling pending waits");
        shutdown.trigger();

        wait_for_signal().await;
        tracing::warn!("Second signal received, exiting");
        std::process::exit(130);
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
