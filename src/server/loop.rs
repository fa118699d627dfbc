// Server loop module
// Accepts connections until the process exits

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config;
use crate::logger;

/// Run the accept loop.
///
/// Accept errors are logged and the loop keeps going; a single bad accept
/// must not take the server down.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<config::AppState>,
    active_connections: Arc<AtomicUsize>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                accept_connection(stream, peer_addr, &state, &active_connections);
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}
