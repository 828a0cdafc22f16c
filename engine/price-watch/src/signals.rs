//! Signal handling for clean shutdown

use tracing::{error, info};

/// Resolves once the operator asks the watcher to stop (Ctrl+C, or SIGTERM on Unix)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Ctrl+C signal received");
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = sigterm() => {}
    }
}

#[cfg(unix)]
async fn sigterm() {
    use signal_hook::consts::SIGTERM;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let flag = Arc::new(AtomicBool::new(false));
    if let Err(e) = signal_hook::flag::register(SIGTERM, Arc::clone(&flag)) {
        error!("Failed to register SIGTERM handler: {}", e);
        return std::future::pending().await;
    }

    while !flag.load(Ordering::Relaxed) {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }
    info!("SIGTERM signal received");
}

#[cfg(not(unix))]
async fn sigterm() {
    std::future::pending().await
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn resolves_on_sigterm() {
        let waiter = tokio::spawn(sigterm());

        // Give the handler a chance to register before raising
        tokio::time::sleep(Duration::from_millis(50)).await;
        signal_hook::low_level::raise(signal_hook::consts::SIGTERM).unwrap();

        tokio::time::timeout(Duration::from_secs(2), waiter).await.unwrap().unwrap();
    }
}
