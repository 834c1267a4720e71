// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Post-load validation of a graph's port references.
//!
//! Two checks run over every node in insertion order:
//!
//! 1. **Output peers**: each id listed by an output port must be an input
//!    port of some node in the graph. A miss is a [`ValidationError`] and
//!    fails the load.
//! 2. **Input parents**: each id listed by an input port should be an output
//!    port of some node. Older documents store parent *node* ids here, so a
//!    miss is only a [`ValidationWarning`].
//!
//! All problems are collected before returning, so one pass reports the
//! whole document.

use std::fmt;

use crate::engine::Graph;
use crate::errors::ValidationError;

/// A reference that does not resolve but does not prevent the graph running.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    pub node_id: String,
    pub port_id: String,
    pub parent_id: String,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Input '{}' of node '{}' lists parent '{}' which is not an output port in this graph",
            self.port_id, self.node_id, self.parent_id
        )
    }
}

/// Checks every port reference in `graph`.
///
/// Returns the warnings when no output peer is unresolved, otherwise every
/// unresolved output peer.
pub fn validate_graph(graph: &Graph) -> Result<Vec<ValidationWarning>, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for node in graph.nodes() {
        for output in node.outputs() {
            for peer_id in output.peers().snapshot() {
                if graph.find_by_port_id(&peer_id).is_err() {
                    errors.push(ValidationError::UnresolvedOutputPeer {
                        node_id: node.id().to_string(),
                        port_id: output.id().to_string(),
                        peer_id,
                    });
                }
            }
        }

        for input in node.inputs() {
            for parent_id in input.peers().snapshot() {
                if graph.find_by_output_port_id(&parent_id).is_err() {
                    warnings.push(ValidationWarning {
                        node_id: node.id().to_string(),
                        port_id: input.id().to_string(),
                        parent_id,
                    });
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(errors)
    }
}
