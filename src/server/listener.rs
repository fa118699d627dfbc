// Listener module
// Creates the TCP listener the accept loop runs on

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

/// Create a `TcpListener` bound to `addr`.
///
/// `SO_REUSEADDR` is enabled so a quickly restarted process can rebind a
/// port still in TIME_WAIT.
///
/// # Arguments
///
/// * `addr` - The socket address to bind to
///
/// # Returns
///
/// * `Ok(TcpListener)` - Successfully created and bound listener
/// * `Err(std::io::Error)` - Failed to create or bind socket
pub fn create_listener(addr: std::net::SocketAddr) -> std::io::Result<TcpListener> {
    // Create socket with appropriate domain (IPv4 or IPv6)
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // Allow binding to a port in TIME_WAIT state
    socket.set_reuse_address(true)?;

    // Set non-blocking mode for async compatibility
    socket.set_nonblocking(true)?;

    // Bind to the specified address
    socket.bind(&addr.into())?;

    // Start listening with a backlog queue size of 128
    socket.listen(128)?;

    // Convert socket2::Socket to std::net::TcpListener, then to tokio::net::TcpListener
    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
