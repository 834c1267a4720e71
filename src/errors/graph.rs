// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::NodeCreationError;

/// Errors from the node type registry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Node type '{0}' is already registered")]
    DuplicateType(String),

    #[error("Unknown node type '{0}'")]
    UnknownNodeType(String),
}

/// Errors from graph mutation and lookup.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("A node with id '{0}' already exists in the graph")]
    DuplicateNodeId(String),

    #[error("Port '{port_id}' of node '{node_id}' collides with a port already in the graph")]
    DuplicatePortId { node_id: String, port_id: String },

    #[error("Node '{0}' not found")]
    NodeNotFound(String),

    /// No node in the graph owns a port with this id.
    #[error("Port '{0}' not found")]
    PortNotFound(String),

    #[error(transparent)]
    Creation(#[from] NodeCreationError),
}
