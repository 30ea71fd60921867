// Server module entry
// Accept loop, connection serving, and graceful shutdown

pub mod connection;
pub mod listener;
pub mod signal;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

pub use connection::accept_connection;
pub use listener::create_listener;
pub use signal::ShutdownSignals;

/// Accept connections until `shutdown` resolves, then drain
///
/// Once `shutdown` yields, the listener is closed and in-flight connections
/// get up to `shutdown_timeout` seconds to finish. Returns whether they all
/// finished within that time.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> bool
where
    F: Future<Output = &'static str>,
{
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &graceful);
                    }
                    Err(e) => tracing::error!("Failed to accept connection: {e}"),
                }
            }

            signal = &mut shutdown => {
                logger::log_shutdown_requested(signal);
                break;
            }
        }
    }

    // Stop accepting before waiting on open connections
    drop(listener);

    let limit = Duration::from_secs(state.config.performance.shutdown_timeout);
    let drained = tokio::time::timeout(limit, graceful.shutdown()).await.is_ok();
    logger::log_server_stopped(drained);
    drained
}
