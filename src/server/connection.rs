// Connection handling module
// Serves a single accepted TCP connection

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;

/// Serve a connection in a spawned task.
///
/// This function:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Configures HTTP/1.1 connection settings (keep-alive, header timeout)
/// 3. Registers the connection with the shutdown coordinator
/// 4. Bounds the whole connection by `connection_timeout`
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    graceful: &GracefulShutdown,
) {
    tracing::trace!("Accepted connection from {peer_addr}");

    let perf = &state.config.performance;
    let timeout_duration = Duration::from_secs(perf.connection_timeout);

    let mut builder = http1::Builder::new();
    builder
        .keep_alive(perf.keep_alive)
        .timer(TokioTimer::new())
        .header_read_timeout(Duration::from_secs(perf.header_read_timeout));

    let state = Arc::clone(state);
    let conn = builder.serve_connection(
        TokioIo::new(stream),
        service_fn(move |req| handler::handle_request(req, Arc::clone(&state), peer_addr)),
    );
    let conn = graceful.watch(conn);

    tokio::spawn(async move {
        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::debug!("Connection error from {peer_addr}: {err}"),
            Err(_) => tracing::warn!(
                "Connection from {peer_addr} timed out after {} seconds",
                timeout_duration.as_secs()
            ),
        }
    });
}
