// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Structural problems found by the post-load validation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// An output port lists a peer that is not an input port of any node.
    UnresolvedOutputPeer {
        /// Node owning the output port
        node_id: String,
        /// The output port id
        port_id: String,
        /// The peer id that could not be resolved
        peer_id: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::UnresolvedOutputPeer {
                node_id,
                port_id,
                peer_id,
            } => write!(
                f,
                "Output '{}' of node '{}' connects to '{}' which is not an input port in this graph",
                port_id, node_id, peer_id
            ),
        }
    }
}

impl std::error::Error for ValidationError {}
