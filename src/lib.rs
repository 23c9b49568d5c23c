//! # rignet
//!
//! Message broker and binary protocol core for real-time experiment rigs.
//!
//! Independent modules (robot/haptic control, trial-control logic, display)
//! exchange low-latency, typed binary messages over UDP. This crate provides
//! the pieces that coordinate them:
//!
//! - **[`broker`]**: the rendezvous service. Modules register an address,
//!   subscribe to each other's traffic, and publish packets the broker fans
//!   out to subscribers. Includes the TCP RPC surface and client.
//! - **[`protocol`]**: the wire format. A fixed 16-byte header plus
//!   type-tagged fixed-layout payloads, with a defensive codec and the
//!   dispatcher that routes decoded commands to the scene engine.
//! - **[`transport`]**: UDP socket primitives.
//! - **[`listener`]**: the per-module inbound loop with cancellation-aware
//!   shutdown.
//! - **[`scene`]**: the abstract command surface of the external
//!   graphics/haptics engine. Rendering and force output live outside this
//!   crate.
//!
//! Delivery is UDP best-effort: no encryption, no acknowledgement, no retry.
//!
//! ## Example
//! ```no_run
//! use rignet::broker::{Broker, SubscribeTarget};
//!
//! # async fn demo() -> rignet::error::Result<()> {
//! let broker = Broker::new();
//! broker.add_module(1, "127.0.0.1", 9001).await?;
//! broker.add_module(2, "127.0.0.1", 9002).await?;
//! broker.subscribe_to(2, SubscribeTarget::Module(1)).await?;
//!
//! let serial = broker.msg_num();
//! let stamp = broker.timestamp();
//! let packet = rignet::protocol::wire::encode(
//!     rignet::protocol::Header { serial_number: serial, timestamp: stamp },
//!     &rignet::protocol::Message::SessionStart,
//! )?;
//! broker.send_message(&packet, 1).await?;
//! # Ok(())
//! # }
//! ```

pub mod broker;
pub mod config;
pub mod error;
pub mod listener;
pub mod protocol;
pub mod scene;
pub mod transport;

pub use broker::{Broker, BrokerClient, SubscribeTarget};
pub use error::{ProtocolError, Result};
pub use listener::Listener;
pub use protocol::{Dispatcher, Header, Message, MessageType, Packet};
pub use scene::SceneControl;
