//! OS signal handling.
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Ctrl+C abandons the running batch; the deadline, barrier and client
//!   are released when the batch future is dropped

/// Resolve when Ctrl+C is received.
///
/// If the handler cannot be installed the future never resolves, so a batch
/// is never abandoned spuriously.
pub async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Interrupt received");
}
