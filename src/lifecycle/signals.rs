//! Process signal handling.

use crate::lifecycle::cancel::Cancellation;

/// Cancels `cancellation` on the first Ctrl-C.
pub fn cancel_on_ctrl_c(cancellation: Cancellation) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, cancelling in-flight requests");
                cancellation.cancel();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });
}
