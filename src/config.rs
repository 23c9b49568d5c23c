//! # Configuration Management
//!
//! Centralized configuration for the broker and for participating modules.
//!
//! This module provides protocol-wide constants plus structured configuration
//! for the broker process and module processes: bind addresses, the broker
//! RPC endpoint, and the module's own id.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment variable overrides (`RIGNET_*`)
//!
//! Defaults mirror a single-host deployment: broker RPC on 127.0.0.1:8080,
//! module inbound traffic on 127.0.0.1:7000.

use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Current supported protocol version
pub const PROTOCOL_VERSION: u8 = 1;

/// Maximum total size of one datagram: header plus the largest payload
pub const MAX_PACKET_LENGTH: usize = 1024;

/// Pseudo module id meaning "every currently registered module" when used
/// as a subscription target. Kept for wire compatibility; inside the crate
/// it is represented as [`SubscribeTarget::AllModules`].
///
/// [`SubscribeTarget::AllModules`]: crate::broker::SubscribeTarget::AllModules
pub const ALL_MODULES_ID: i32 = 999;

/// Capacity of fixed-size object/effect name fields on the wire
pub const NAME_LEN: usize = 32;

/// Capacity of the fixed-size recording filename field on the wire
pub const FILE_NAME_LEN: usize = 64;

/// Configuration for the broker process
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrokerConfig {
    /// Address the broker's RPC endpoint listens on
    pub listen: SocketAddr,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".parse().expect("static default address"),
        }
    }
}

impl BrokerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables, starting from defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("RIGNET_BROKER_ADDR") {
            config.listen = addr
                .parse()
                .map_err(|_| ProtocolError::ConfigError(format!("Invalid RIGNET_BROKER_ADDR: {addr}")))?;
        }

        Ok(config)
    }
}

/// Configuration for one participating module process
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModuleConfig {
    /// This module's id on the messaging fabric. Small positive integer,
    /// assigned by deployment configuration, never generated.
    pub module_id: i32,

    /// Address this module's inbound UDP socket binds to
    pub listen: SocketAddr,

    /// Address of the broker's RPC endpoint
    pub broker: SocketAddr,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            module_id: 1,
            listen: "127.0.0.1:7000".parse().expect("static default address"),
            broker: "127.0.0.1:8080".parse().expect("static default address"),
        }
    }
}

impl ModuleConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables, starting from defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(id) = std::env::var("RIGNET_MODULE_ID") {
            config.module_id = id
                .parse()
                .map_err(|_| ProtocolError::ConfigError(format!("Invalid RIGNET_MODULE_ID: {id}")))?;
        }

        if let Ok(addr) = std::env::var("RIGNET_MODULE_ADDR") {
            config.listen = addr
                .parse()
                .map_err(|_| ProtocolError::ConfigError(format!("Invalid RIGNET_MODULE_ADDR: {addr}")))?;
        }

        if let Ok(addr) = std::env::var("RIGNET_BROKER_ADDR") {
            config.broker = addr
                .parse()
                .map_err(|_| ProtocolError::ConfigError(format!("Invalid RIGNET_BROKER_ADDR: {addr}")))?;
        }

        Ok(config)
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.module_id <= 0 {
            errors.push(format!(
                "Module id must be a positive integer, got {}",
                self.module_id
            ));
        }

        if self.module_id == ALL_MODULES_ID {
            errors.push(format!(
                "Module id {ALL_MODULES_ID} is reserved for broadcast subscription"
            ));
        }

        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}
