// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Input and output ports.
//!
//! A port is a named connection point with a stable id and a list of peer
//! port ids. Outputs list the input ports they feed; inputs list the output
//! ports that feed them. Which of the two a port is follows from the list it
//! sits in on its node, not from a tag on the port.

use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

/// Presentational placement of a port relative to its node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PortPosition {
    pub x: f64,
    pub y: f64,
}

impl PortPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Peer port ids, editable after construction.
#[derive(Debug, Default)]
pub struct PeerList(RwLock<Vec<String>>);

impl PeerList {
    pub fn new(peers: Vec<String>) -> Self {
        Self(RwLock::new(peers))
    }

    /// Copy of the current peer ids, in order.
    pub fn snapshot(&self) -> Vec<String> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.0.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, peer_id: &str) -> bool {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|p| same_port_id(p, peer_id))
    }

    /// Appends the peer unless it is already listed. Returns true when added.
    pub fn add(&self, peer_id: &str) -> bool {
        let mut peers = self.0.write().unwrap_or_else(PoisonError::into_inner);
        if peers.iter().any(|p| same_port_id(p, peer_id)) {
            return false;
        }
        peers.push(peer_id.to_string());
        true
    }

    /// Removes every entry for `peer_id`. Returns true when something was removed.
    pub fn remove(&self, peer_id: &str) -> bool {
        let mut peers = self.0.write().unwrap_or_else(PoisonError::into_inner);
        let before = peers.len();
        peers.retain(|p| !same_port_id(p, peer_id));
        peers.len() != before
    }

    /// Keeps only the peers for which `keep` returns true.
    pub fn retain(&self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let mut peers = self.0.write().unwrap_or_else(PoisonError::into_inner);
        let before = peers.len();
        peers.retain(|p| keep(p));
        before - peers.len()
    }
}

impl Clone for PeerList {
    fn clone(&self) -> Self {
        Self::new(self.snapshot())
    }
}

/// Compares two textual port ids, treating differently-cased UUIDs as equal.
pub fn same_port_id(a: &str, b: &str) -> bool {
    match (Uuid::parse_str(a), Uuid::parse_str(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// A connection point owned by exactly one node.
#[derive(Debug, Clone)]
pub struct Port {
    id: Uuid,
    name: String,
    peers: PeerList,
    position: PortPosition,
}

impl Port {
    /// New unconnected port with a time-ordered id.
    pub fn new(name: impl Into<String>, position: PortPosition) -> Self {
        Self::with_id(Uuid::now_v7(), name, Vec::new(), position)
    }

    pub fn with_id(
        id: Uuid,
        name: impl Into<String>,
        peers: Vec<String>,
        position: PortPosition,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            peers: PeerList::new(peers),
            position,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn peers(&self) -> &PeerList {
        &self.peers
    }

    pub fn position(&self) -> PortPosition {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ports_get_distinct_ids() {
        let a = Port::new("Output 1", PortPosition::default());
        let b = Port::new("Output 1", PortPosition::default());
        assert_ne!(a.id(), b.id());
        assert!(a.peers().is_empty());
    }

    #[test]
    fn test_peer_edits_keep_port_identity() {
        let port = Port::new("Output", PortPosition::new(1.0, 1.0));
        let id = port.id();
        let peer = Uuid::now_v7().to_string();

        assert!(port.peers().add(&peer));
        assert!(!port.peers().add(&peer.to_uppercase()));
        assert!(port.peers().contains(&peer));
        assert!(port.peers().remove(&peer));
        assert!(port.peers().is_empty());
        assert_eq!(port.id(), id);
    }

    #[test]
    fn test_same_port_id_ignores_case_for_uuids() {
        let id = Uuid::now_v7().to_string();
        assert!(same_port_id(&id, &id.to_uppercase()));
        assert!(!same_port_id("abc", "ABC"));
    }
}
