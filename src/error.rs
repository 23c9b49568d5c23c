//! # Error Types
//!
//! Comprehensive error handling for the broker and protocol core.
//!
//! This module defines all error variants that can occur during protocol
//! operations, from low-level I/O errors to malformed wire packets.
//!
//! ## Error Categories
//! - **I/O Errors**: Socket and file system failures
//! - **Wire Errors**: Truncated packets, unknown type tags, bad name fields
//! - **Registry Errors**: Unknown or duplicate module ids
//! - **RPC Errors**: Bad frames, unexpected responses, closed connections
//!
//! All errors implement `std::error::Error` for interoperability.
//!
//! ## Example Usage
//! ```rust
//! use rignet::error::{ProtocolError, Result};
//!
//! fn require_len(buf: &[u8], needed: usize) -> Result<()> {
//!     if buf.len() < needed {
//!         return Err(ProtocolError::Truncated {
//!             needed,
//!             got: buf.len(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use std::io;
use thiserror::Error;

/// ProtocolError is the primary error type for all broker and codec operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Packet truncated: needed {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },

    #[error("Packet too large: {0} bytes")]
    OversizedPacket(usize),

    #[error("Unknown message type tag: {0}")]
    UnknownMessageType(u16),

    #[error("Name field too long: {0} bytes")]
    NameTooLong(usize),

    #[error("Name field is not valid UTF-8")]
    InvalidName,

    #[error("Unknown module id: {0}")]
    UnknownModule(i32),

    #[error("Module id {0} is already registered")]
    ModuleExists(i32),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Send to module {module} failed: {source}")]
    SendFailed {
        module: i32,
        #[source]
        source: io::Error,
    },

    #[error("Invalid RPC frame")]
    InvalidFrame,

    #[error("Unexpected RPC response")]
    UnexpectedResponse,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
