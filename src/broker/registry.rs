//! # Module Registry
//!
//! The broker's private mapping of module id to destination, outbound
//! socket, and subscriber set. Exists as its own component purely to keep
//! the concurrency-sensitive mutable state separate from RPC marshaling;
//! the broker exposes no registry surface of its own.

use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;

use crate::config::ALL_MODULES_ID;
use crate::error::{ProtocolError, Result};

/// Module identifier on the messaging fabric. Small positive integer,
/// assigned by deployment configuration.
pub type ModuleId = i32;

/// Target of a subscription request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeTarget {
    /// Subscribe to one module's traffic
    Module(ModuleId),
    /// Subscribe to every module registered at the time of the call.
    /// Modules registered later are not retroactively covered.
    AllModules,
}

impl SubscribeTarget {
    /// Interpret a raw wire id, mapping the reserved broadcast id to the
    /// explicit variant
    pub fn from_wire(id: i32) -> Self {
        if id == ALL_MODULES_ID {
            SubscribeTarget::AllModules
        } else {
            SubscribeTarget::Module(id)
        }
    }
}

/// Everything the broker knows about one registered module.
///
/// Owned exclusively by the registry: created by registration, never
/// mutated elsewhere, dropped only at broker shutdown.
pub struct ModuleRecord {
    /// Where this module receives its datagrams
    pub dest: SocketAddr,
    /// Outbound socket used to reach `dest`
    pub socket: Arc<UdpSocket>,
    /// Modules that receive this module's published traffic
    pub subscribers: BTreeSet<ModuleId>,
}

/// One subscriber destination captured under the registry lock, so fan-out
/// can run without holding it
#[derive(Clone)]
pub struct FanoutTarget {
    pub module: ModuleId,
    pub socket: Arc<UdpSocket>,
    pub dest: SocketAddr,
}

/// id -> record map behind the broker's lock
#[derive(Default)]
pub struct Registry {
    modules: BTreeMap<ModuleId, ModuleRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module. A live id is never silently clobbered; re-use of
    /// an id is an error so an open socket cannot be leaked by accident.
    pub fn insert(&mut self, id: ModuleId, record: ModuleRecord) -> Result<()> {
        if self.modules.contains_key(&id) {
            return Err(ProtocolError::ModuleExists(id));
        }
        self.modules.insert(id, record);
        Ok(())
    }

    pub fn contains(&self, id: ModuleId) -> bool {
        self.modules.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Add `subscriber` to the target's subscriber set. Sets are idempotent:
    /// resubscribing is a no-op. `AllModules` covers only the modules
    /// registered at call time.
    pub fn subscribe(&mut self, subscriber: ModuleId, target: SubscribeTarget) -> Result<()> {
        match target {
            SubscribeTarget::Module(id) => {
                let record = self
                    .modules
                    .get_mut(&id)
                    .ok_or(ProtocolError::UnknownModule(id))?;
                record.subscribers.insert(subscriber);
            }
            SubscribeTarget::AllModules => {
                for record in self.modules.values_mut() {
                    record.subscribers.insert(subscriber);
                }
            }
        }
        Ok(())
    }

    /// Subscriber set of one module, for tests and diagnostics
    pub fn subscribers(&self, id: ModuleId) -> Result<&BTreeSet<ModuleId>> {
        self.modules
            .get(&id)
            .map(|r| &r.subscribers)
            .ok_or(ProtocolError::UnknownModule(id))
    }

    /// Snapshot the fan-out targets for a sender's subscriber set.
    ///
    /// Iteration order is ascending module id, so delivery order is
    /// deterministic for testing. Subscribers with no record of their own
    /// are skipped; they have nowhere to be delivered to.
    pub fn fanout_targets(&self, sender: ModuleId) -> Result<Vec<FanoutTarget>> {
        let record = self
            .modules
            .get(&sender)
            .ok_or(ProtocolError::UnknownModule(sender))?;

        Ok(record
            .subscribers
            .iter()
            .filter_map(|id| {
                self.modules.get(id).map(|sub| FanoutTarget {
                    module: *id,
                    socket: Arc::clone(&sub.socket),
                    dest: sub.dest,
                })
            })
            .collect())
    }
}
