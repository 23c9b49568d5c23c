//! # Protocol Layer
//!
//! The typed binary protocol spoken between modules: the message catalogue,
//! the fixed-layout wire codec, and the per-module dispatcher that turns
//! inbound datagrams into scene-mutation calls.

pub mod dispatcher;
pub mod message;
pub mod wire;

pub use dispatcher::Dispatcher;
pub use message::{Header, Message, MessageType, Packet};
