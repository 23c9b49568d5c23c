//! # UDP Socket Helpers
//!
//! All raw socket setup lives here so broker and listener code never touch
//! socket options directly. Datagram traffic is fire-and-forget: no
//! acknowledgement, no retry, no ordering guarantee across subscribers.

use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::error::Result;

/// Open an outbound socket on an ephemeral local port, broadcast enabled.
///
/// Used by the broker for per-module fan-out sockets.
pub async fn outbound() -> Result<UdpSocket> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.set_broadcast(true)?;
    debug!(local = %socket.local_addr()?, "Opened outbound UDP socket");
    Ok(socket)
}

/// Bind a module's inbound socket at a fixed address.
pub async fn bind(addr: SocketAddr) -> Result<UdpSocket> {
    let socket = UdpSocket::bind(addr).await?;
    socket.set_broadcast(true)?;
    info!(local = %socket.local_addr()?, "Bound inbound UDP socket");
    Ok(socket)
}
