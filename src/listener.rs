//! # Inbound Listener
//!
//! One background task per module: blocks on the module's inbound UDP
//! socket and hands each datagram to the dispatcher.
//!
//! The receive is cancellation-aware rather than polled: the loop suspends
//! inside `recv_from` and a shutdown channel wakes it immediately, so
//! shutdown latency is not coupled to any poll interval. Malformed
//! datagrams are logged and dropped; they never terminate the loop.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::MAX_PACKET_LENGTH;
use crate::error::Result;
use crate::protocol::dispatcher::Dispatcher;
use crate::scene::SceneControl;
use crate::transport::udp;

/// Per-module inbound loop: socket plus dispatcher
pub struct Listener<S: SceneControl> {
    socket: UdpSocket,
    dispatcher: Dispatcher<S>,
}

impl<S: SceneControl> Listener<S> {
    /// Bind the module's inbound socket and attach a dispatcher for `scene`
    pub async fn bind(addr: SocketAddr, scene: Arc<S>) -> Result<Self> {
        let socket = udp::bind(addr).await?;
        Ok(Self {
            socket,
            dispatcher: Dispatcher::new(scene),
        })
    }

    /// Actual bound address; useful when binding port 0
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Datagrams dropped for carrying an unrecognized type tag
    pub fn unknown_messages(&self) -> u64 {
        self.dispatcher.unknown_messages()
    }

    /// Receive and dispatch until the shutdown channel fires.
    ///
    /// The socket closes when the listener drops on return; no dispatch
    /// happens after shutdown is signaled.
    pub async fn run(self, mut shutdown_rx: mpsc::Receiver<()>) {
        let mut buf = [0u8; MAX_PACKET_LENGTH];

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Listener shutting down");
                    return;
                }

                recv_result = self.socket.recv_from(&mut buf) => {
                    match recv_result {
                        Ok((len, peer)) => {
                            debug!(bytes = len, peer = %peer, "Datagram received");
                            if let Err(e) = self.dispatcher.dispatch(&buf[..len]) {
                                warn!(error = %e, peer = %peer, "Dropping malformed datagram");
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "Receive error");
                        }
                    }
                }
            }
        }
    }
}
