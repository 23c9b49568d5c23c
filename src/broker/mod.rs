//! # Broker
//!
//! The rendezvous service of the messaging fabric. Modules register an
//! address and port, subscribe to each other's traffic, and publish packets
//! that the broker fans out over UDP to every subscriber of the sender.
//!
//! The broker also issues the sequence numbers and timestamps producers use
//! to stamp outgoing packets, so serial numbers are globally ordered across
//! all producers.
//!
//! ## Concurrency
//! All operations may race. The registry sits behind one async mutex;
//! `send_message` snapshots the subscriber set under the lock and performs
//! the network sends without it, so one slow subscriber cannot block a
//! concurrent registration. The broker never calls back into a module while
//! holding the lock, so no deadlock is possible.

pub mod registry;
pub mod rpc;

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::{ALL_MODULES_ID, MAX_PACKET_LENGTH};
use crate::error::{ProtocolError, Result};
use crate::transport::udp;

pub use registry::{ModuleId, ModuleRecord, Registry, SubscribeTarget};
pub use rpc::{serve, BrokerClient, BrokerRequest, BrokerResponse};

/// The rendezvous service: registry, fan-out, and counter issuance
pub struct Broker {
    registry: Mutex<Registry>,
    serial: AtomicU32,
    start: Instant,
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

impl Broker {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry::new()),
            serial: AtomicU32::new(0),
            start: Instant::now(),
        }
    }

    /// Register a module reachable at `ip:port`.
    ///
    /// Opens a broadcast-capable outbound UDP socket for the module and
    /// stores its record with an empty subscriber set. Re-registration of a
    /// live id is rejected rather than silently replacing an open socket.
    pub async fn add_module(&self, id: ModuleId, ip: &str, port: u16) -> Result<()> {
        if id <= 0 || id == ALL_MODULES_ID {
            return Err(ProtocolError::ConfigError(format!(
                "Module id {id} is not a valid registration id"
            )));
        }

        let dest: std::net::SocketAddr = format!("{ip}:{port}")
            .parse()
            .map_err(|_| ProtocolError::InvalidAddress(format!("{ip}:{port}")))?;

        {
            let registry = self.registry.lock().await;
            if registry.contains(id) {
                return Err(ProtocolError::ModuleExists(id));
            }
        }

        let socket = std::sync::Arc::new(udp::outbound().await?);

        let mut registry = self.registry.lock().await;
        registry.insert(
            id,
            ModuleRecord {
                dest,
                socket,
                subscribers: Default::default(),
            },
        )?;
        info!(module = id, dest = %dest, "Added module");
        Ok(())
    }

    /// Add `subscriber` to a target module's subscriber set.
    ///
    /// [`SubscribeTarget::AllModules`] covers every module registered at
    /// call time only. Resubscribing is idempotent. No cycle detection is
    /// performed; mutual subscriptions are the caller's responsibility.
    pub async fn subscribe_to(&self, subscriber: ModuleId, target: SubscribeTarget) -> Result<()> {
        let mut registry = self.registry.lock().await;
        registry.subscribe(subscriber, target)?;
        info!(subscriber, ?target, "Subscription added");
        Ok(())
    }

    /// Fan a raw packet out to every subscriber of `sender`.
    ///
    /// Best-effort, not atomic: an individual send failure is logged, the
    /// remaining subscribers still receive the packet, and the aggregate
    /// result reports the first failure. Delivery order is ascending
    /// subscriber id.
    pub async fn send_message(&self, packet: &[u8], sender: ModuleId) -> Result<()> {
        if packet.len() > MAX_PACKET_LENGTH {
            return Err(ProtocolError::OversizedPacket(packet.len()));
        }

        let targets = {
            let registry = self.registry.lock().await;
            registry.fanout_targets(sender)?
        };

        let mut first_failure = None;
        for target in targets {
            if let Err(e) = target.socket.send_to(packet, target.dest).await {
                warn!(
                    sender,
                    subscriber = target.module,
                    dest = %target.dest,
                    error = %e,
                    "Datagram send failed"
                );
                if first_failure.is_none() {
                    first_failure = Some(ProtocolError::SendFailed {
                        module: target.module,
                        source: e,
                    });
                }
            }
        }

        match first_failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Return and post-increment the broker-scoped sequence counter.
    /// Strictly increasing across concurrent callers, never reset.
    pub fn msg_num(&self) -> u32 {
        self.serial.fetch_add(1, Ordering::Relaxed)
    }

    /// Seconds elapsed since broker start, from a monotonic clock
    pub fn timestamp(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Number of registered modules
    pub async fn module_count(&self) -> usize {
        self.registry.lock().await.len()
    }

    /// Subscriber set of one module, for tests and diagnostics
    pub async fn subscribers_of(&self, id: ModuleId) -> Result<Vec<ModuleId>> {
        let registry = self.registry.lock().await;
        Ok(registry.subscribers(id)?.iter().copied().collect())
    }
}
