use axum::Router;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinError;

/// How `serve` finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every connection was closed
    Drained,
    /// The grace period ran out with requests still running. Those keep their
    /// connection tasks, and whatever they hold, until the process exits.
    GraceElapsed,
}

/// Serve `app` until `shutdown` resolves, then stop accepting connections and
/// give in-flight requests `grace` to finish. Once the grace period is over this
/// returns without waiting.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    grace: Duration,
) -> io::Result<ShutdownOutcome>
where
    F: Future<Output = ()> + Send,
{
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = stop_rx.await;
    });
    let mut server_task = tokio::spawn(async move { server.await });

    tokio::pin!(shutdown);
    tokio::select! {
        result = &mut server_task => return flatten(result).map(|_| ShutdownOutcome::Drained),
        _ = &mut shutdown => {}
    }

    tracing::info!("shutting down gracefully, waiting up to {:?} for in-flight requests", grace);
    let _ = stop_tx.send(());

    match tokio::time::timeout(grace, &mut server_task).await {
        Ok(result) => flatten(result).map(|_| ShutdownOutcome::Drained),
        Err(_) => {
            tracing::warn!("grace period elapsed, forcing shutdown");
            server_task.abort();
            Ok(ShutdownOutcome::GraceElapsed)
        }
    }
}

fn flatten(result: Result<io::Result<()>, JoinError>) -> io::Result<()> {
    result.map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}

/// Resolves on SIGINT or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received SIGINT"),
        _ = terminate => tracing::info!("received SIGTERM"),
    }
}
