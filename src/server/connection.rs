// Connection handling module
// Accepts and serves a single TCP connection

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;

use crate::config;
use crate::handler;
use crate::logger;

/// Accept and process a connection, checking limits and logging.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: &Arc<config::AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            // Exceeded limit: rollback counter and reject
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return;
        }
    }

    if state.config.logging.access_log {
        logger::log_connection_accepted(&peer_addr);
    }

    // Handle the connection in a spawned task
    handle_connection(stream, peer_addr, Arc::clone(state), Arc::clone(conn_counter));
}

/// Handle a single connection in a spawned task.
///
/// Wraps the TCP stream in `TokioIo`, serves it over HTTP/1.1 with
/// keep-alive per config, applies the read/write timeout, and decrements
/// the connection counter when done.
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: Arc<config::AppState>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let keep_alive_timeout = state.config.performance.keep_alive_timeout;
        let timeout_duration = std::time::Duration::from_secs(std::cmp::max(
            state.config.performance.read_timeout,
            state.config.performance.write_timeout,
        ));

        let mut builder = http1::Builder::new();
        if keep_alive_timeout > 0 {
            builder.keep_alive(true);
        }

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let state_clone = Arc::clone(&state);
                async move { handler::handle_request(req, state_clone, peer_addr).await }
            }),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }

        // Decrement active connection counter
        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}
